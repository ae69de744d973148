// ============================================================================
// Phonebook Core - Composite Writer Port
// File: crates/phonebook-core/src/repositories/composite_writer.rs
// ============================================================================
//! Multi-statement writes that must be all-or-nothing.

use async_trait::async_trait;

use crate::domain::{Department, DepartmentDraft, WorkerProfile};
use crate::error::DomainError;
use crate::tenancy::Partition;

/// Each method runs as one transaction. Statement order is fixed: parent
/// rows before child rows, delete before re-insert. The first failing
/// statement aborts the rest and the transaction rolls back, so on any
/// error the partition is exactly as it was before the call. Dropping the
/// returned future mid-flight also rolls back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompositeWriter: Send + Sync {
    /// Inserts the department row, then one row per section.
    async fn create_department(&self, partition: &Partition, draft: &DepartmentDraft) -> Result<Department, DomainError>;

    /// Deletes the department named `old_name` (and its sections), then
    /// inserts `draft` as a new department with its sections. `NotFound`
    /// if `old_name` does not exist.
    async fn replace_department(
        &self,
        partition: &Partition,
        old_name: &str,
        draft: &DepartmentDraft,
    ) -> Result<Department, DomainError>;

    /// Inserts every worker in order. Fails fast: the first failing record
    /// aborts the batch with `ImportAborted` naming its 1-based position
    /// and email, and none of the batch is kept.
    async fn import_workers(&self, partition: &Partition, workers: &[WorkerProfile]) -> Result<usize, DomainError>;
}
