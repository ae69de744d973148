//! Worker repository trait (port)

use async_trait::async_trait;

use crate::domain::{Worker, WorkerProfile};
use crate::error::DomainError;
use crate::services::birthday::MonthDay;
use crate::services::search::{SearchQuery, WorkerFilter};
use crate::tenancy::Partition;

/// Single-statement worker operations, each confined to one partition.
///
/// Lookups by key return `NotFound` rather than `Option`; a duplicate email
/// is `AlreadyExists`; anything else is `StorageFailure`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn create(&self, partition: &Partition, profile: &WorkerProfile) -> Result<Worker, DomainError>;
    /// The full record, photo included.
    async fn find_by_email(&self, partition: &Partition, email: &str) -> Result<Worker, DomainError>;
    /// Listing reads (`list`, `search`, `birthdays_on`) leave the photo out.
    async fn list(&self, partition: &Partition, filter: &WorkerFilter) -> Result<Vec<Worker>, DomainError>;
    /// Replaces every field except the photo of the worker currently keyed by `email`.
    async fn update(&self, partition: &Partition, email: &str, profile: &WorkerProfile) -> Result<Worker, DomainError>;
    /// Like `update`, but only while the stored fields (photo excluded) still
    /// equal `expected`; the comparison and the write are atomic. `Ok(None)`
    /// means the record changed since `expected` was read.
    async fn update_if_unchanged(
        &self,
        partition: &Partition,
        email: &str,
        expected: &WorkerProfile,
        profile: &WorkerProfile,
    ) -> Result<Option<Worker>, DomainError>;
    async fn delete(&self, partition: &Partition, email: &str) -> Result<(), DomainError>;
    /// Callers must not pass an empty query.
    async fn search(&self, partition: &Partition, query: &SearchQuery) -> Result<Vec<Worker>, DomainError>;
    async fn birthdays_on(&self, partition: &Partition, day: MonthDay) -> Result<Vec<Worker>, DomainError>;
    async fn find_photo(&self, partition: &Partition, email: &str) -> Result<Option<Vec<u8>>, DomainError>;
    /// Stores `photo` only if the worker has none, in one atomic step.
    /// `AlreadyExists { entity: "photo" }` when one is already stored.
    async fn attach_photo(&self, partition: &Partition, email: &str, photo: Vec<u8>) -> Result<(), DomainError>;
    /// Unconditional; `None` clears the photo.
    async fn set_photo(&self, partition: &Partition, email: &str, photo: Option<Vec<u8>>) -> Result<(), DomainError>;
}
