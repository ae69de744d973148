use std::sync::Arc;
use std::time::Duration;

use phonebook_core::services::{CredentialResolver, DepartmentService, EmergencyListing, WorkerService};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub workers: Arc<WorkerService>,
    pub departments: Arc<DepartmentService>,
    pub emergency: Arc<EmergencyListing>,
    pub resolver: Arc<CredentialResolver>,
    /// Per-operation deadline applied to every request context.
    pub deadline: Option<Duration>,
    /// Cancelled on shutdown; each request gets a child token.
    pub shutdown: CancellationToken,
}
