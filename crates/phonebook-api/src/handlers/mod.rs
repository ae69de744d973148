//! HTTP handlers

pub mod auth;
pub mod departments;
pub mod health;
pub mod services;
pub mod workers;

pub type ApiResult<T> = Result<axum::Json<crate::response::ApiResponse<T>>, crate::error::ApiError>;
