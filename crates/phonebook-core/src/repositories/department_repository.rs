//! Department repository trait (port)

use async_trait::async_trait;

use crate::domain::Department;
use crate::error::DomainError;
use crate::tenancy::Partition;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// All departments with their sections, ordered by name.
    async fn list(&self, partition: &Partition) -> Result<Vec<Department>, DomainError>;
    async fn find_by_name(&self, partition: &Partition, name: &str) -> Result<Department, DomainError>;
    /// Removes the department and, with it, its sections.
    async fn delete(&self, partition: &Partition, name: &str) -> Result<(), DomainError>;
}
