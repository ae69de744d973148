//! Emergency services - GET /api/v1/services

use axum::{extract::State, Extension, Json};
use phonebook_core::{EmergencyService, RequestContext};

use super::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

pub async fn list_services(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Vec<EmergencyService>> {
    let services = state.emergency.list_services(&ctx).await?;
    Ok(Json(ApiResponse::success(services)))
}
