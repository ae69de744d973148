//! Emergency service repository trait (port)

use async_trait::async_trait;

use crate::domain::EmergencyService;
use crate::error::DomainError;

/// Read-only access to the global emergency listing; not partitioned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<EmergencyService>, DomainError>;
}
