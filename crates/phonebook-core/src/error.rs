//! Domain errors

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// Unexpected persistence failure. `source` keeps the driver error for
    /// diagnostics; the message itself never carries statement text.
    #[error("Storage failure in {op} (tenant: {tenant})")]
    StorageFailure {
        op: &'static str,
        tenant: String,
        #[source]
        source: BoxError,
    },

    #[error("Import aborted at record {position} ({email}): {source}")]
    ImportAborted {
        position: usize,
        email: String,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The record changed between the policy check and the write, more
    /// often than the caller was willing to retry.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        DomainError::NotFound { entity, key: key.into() }
    }

    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        DomainError::AlreadyExists { entity, key: key.into() }
    }

    pub fn storage(op: &'static str, tenant: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DomainError::StorageFailure { op, tenant: tenant.into(), source: source.into() }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
