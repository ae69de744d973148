//! sqlx error -> DomainError

use phonebook_core::{DomainError, Partition};
use tracing::error;

/// Maps a failed statement. A unique-constraint violation becomes
/// `AlreadyExists { entity, key }`; everything else is a logged
/// `StorageFailure`.
pub(crate) fn write_error(
    op: &'static str,
    partition: &Partition,
    entity: &'static str,
    key: &str,
    e: sqlx::Error,
) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::already_exists(entity, key);
        }
    }
    storage_error(op, partition.schema(), e)
}

pub(crate) fn storage_error(op: &'static str, tenant: &str, e: sqlx::Error) -> DomainError {
    error!(op, tenant, error = %e, "database error");
    DomainError::storage(op, tenant, e)
}
