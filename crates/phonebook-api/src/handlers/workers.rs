// ============================================================================
// Phonebook API - Worker Handlers
// File: crates/phonebook-api/src/handlers/workers.rs
// ============================================================================
//! Worker CRUD, search, birthdays, bulk import and photos.
//! Every route is nested under `/api/v1/{institute}`.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use phonebook_core::services::BirthdayWindow;
use phonebook_core::{DomainError, RequestContext, Worker, WorkerProfile};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub department: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub department: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// GET /workers
pub async fn list_workers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Worker>> {
    let workers = state
        .workers
        .list_workers(&ctx, &institute, params.department.as_deref(), params.section.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(workers)))
}

/// POST /workers
pub async fn create_worker(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
    Json(profile): Json<WorkerProfile>,
) -> Result<(StatusCode, Json<ApiResponse<Worker>>), ApiError> {
    let worker = state.workers.create_worker(&ctx, &institute, profile).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(worker))))
}

/// GET /workers/{email}
pub async fn get_worker(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
) -> ApiResult<Worker> {
    let worker = state.workers.get_worker(&ctx, &institute, &email).await?;
    Ok(Json(ApiResponse::success(worker)))
}

/// PUT /workers/{email}
pub async fn update_worker(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
    Json(profile): Json<WorkerProfile>,
) -> ApiResult<Worker> {
    let worker = state.workers.update_worker(&ctx, &institute, &email, profile).await?;
    Ok(Json(ApiResponse::success(worker)))
}

/// DELETE /workers/{email}
pub async fn delete_worker(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.workers.delete_worker(&ctx, &institute, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /workers/search?q=..&department=..&section=..
pub async fn search_workers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<Worker>> {
    let workers = state
        .workers
        .search(
            &ctx,
            &institute,
            &params.q,
            params.department.as_deref(),
            params.section.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(workers)))
}

/// GET /workers/birthdays/{today|tomorrow}
pub async fn birthdays(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, window)): Path<(String, BirthdayWindow)>,
) -> ApiResult<Vec<Worker>> {
    let workers = state.workers.birthdays(&ctx, &institute, window).await?;
    Ok(Json(ApiResponse::success(workers)))
}

/// POST /workers/import with a JSON array of profiles
pub async fn import_workers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(institute): Path<String>,
    Json(profiles): Json<Vec<WorkerProfile>>,
) -> ApiResult<ImportResponse> {
    let imported = state.workers.import_workers(&ctx, &institute, profiles).await?;
    Ok(Json(ApiResponse::success(ImportResponse { imported })))
}

/// GET /workers/{email}/photo
pub async fn get_photo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let photo = state
        .workers
        .get_photo(&ctx, &institute, &email)
        .await?
        .ok_or_else(|| DomainError::not_found("photo", email))?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], photo))
}

/// POST /workers/{email}/photo
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.workers.upload_photo(&ctx, &institute, &email, body.to_vec()).await?;
    Ok(StatusCode::CREATED)
}

/// PUT /workers/{email}/photo
pub async fn replace_photo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.workers.replace_photo(&ctx, &institute, &email, body.to_vec()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /workers/{email}/photo
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((institute, email)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.workers.delete_photo(&ctx, &institute, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}
