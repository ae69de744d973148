//! DomainError -> HTTP status + envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phonebook_core::DomainError;
use serde_json::json;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        let ApiError::Domain(err) = self;
        match err {
            DomainError::UnknownTenant(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_TENANT"),
            DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DomainError::AlreadyExists { .. } => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            DomainError::ImportAborted { .. } => (StatusCode::CONFLICT, "IMPORT_ABORTED"),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            DomainError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            DomainError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            DomainError::DeadlineExceeded => (StatusCode::REQUEST_TIMEOUT, "DEADLINE_EXCEEDED"),
            DomainError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
            DomainError::StorageFailure { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let (message, details) = match &self {
            ApiError::Domain(DomainError::StorageFailure { op, tenant, source }) => {
                tracing::error!(op, tenant = %tenant, error = %source, "storage failure");
                ("Internal storage error".to_string(), None)
            }
            ApiError::Domain(DomainError::ImportAborted { position, email, source }) => {
                tracing::warn!(position, "import aborted: {}", source);
                (
                    self.to_string(),
                    Some(json!({ "position": position, "email": email, "reason": source.to_string() })),
                )
            }
            other => {
                tracing::debug!(status = status.as_u16(), "{}", other);
                (other.to_string(), None)
            }
        };

        (status, Json(ApiResponse::error(code, &message, details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(DomainError::UnknownTenant("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(DomainError::not_found("worker", "a")), StatusCode::NOT_FOUND);
        assert_eq!(status(DomainError::already_exists("worker", "a")), StatusCode::CONFLICT);
        assert_eq!(status(DomainError::Conflict("worker a".into())), StatusCode::CONFLICT);
        assert_eq!(status(DomainError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(DomainError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(DomainError::PayloadTooLarge("x".into())), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            status(DomainError::storage("workers.create", "grafit", "boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
