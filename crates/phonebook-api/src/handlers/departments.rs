//! Department handlers, nested under `/api/v1/{institute}`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use phonebook_core::{Department, DepartmentDraft, RequestContext, Section};

use super::ApiResult;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /departments
pub async fn list_departments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
) -> ApiResult<Vec<Department>> {
    let departments = state.departments.list_departments(&ctx, &institute).await?;
    Ok(Json(ApiResponse::success(departments)))
}

/// POST /departments
pub async fn create_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
    Json(draft): Json<DepartmentDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Department>>), ApiError> {
    let department = state.departments.create_department(&ctx, &institute, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(department))))
}

/// PUT /departments/{name}
pub async fn update_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, name)): Path<(String, String)>,
    Json(draft): Json<DepartmentDraft>,
) -> ApiResult<Department> {
    let department = state
        .departments
        .update_department(&ctx, &institute, &name, draft)
        .await?;
    Ok(Json(ApiResponse::success(department)))
}

/// DELETE /departments/{name}
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.departments.delete_department(&ctx, &institute, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /departments/{name}/sections
pub async fn list_sections(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, name)): Path<(String, String)>,
) -> ApiResult<Vec<Section>> {
    let sections = state.departments.list_sections(&ctx, &institute, &name).await?;
    Ok(Json(ApiResponse::success(sections)))
}
