//! Role introspection - GET /api/v1/auth/role

use axum::{Extension, Json};
use phonebook_core::{RequestContext, Role};
use serde::Serialize;

use crate::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<i64>,
}

pub async fn check_role(Extension(ctx): Extension<RequestContext>) -> Json<ApiResponse<RoleResponse>> {
    Json(ApiResponse::success(RoleResponse {
        role: ctx.role,
        subject: ctx.subject.map(|s| s.0),
    }))
}
