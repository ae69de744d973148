//! Global emergency-contact listing (no tenant)

use std::sync::Arc;

use crate::context::RequestContext;
use crate::domain::EmergencyService;
use crate::error::DomainError;
use crate::repositories::ServiceRepository;

pub struct EmergencyListing {
    services: Arc<dyn ServiceRepository>,
}

impl EmergencyListing {
    pub fn new(services: Arc<dyn ServiceRepository>) -> Self {
        Self { services }
    }

    /// Every service, ordered by name.
    pub async fn list_services(&self, ctx: &RequestContext) -> Result<Vec<EmergencyService>, DomainError> {
        ctx.run("services.list", self.services.list()).await
    }
}
