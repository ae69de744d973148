//! Directory services and the pure logic they build on

pub mod birthday;
pub mod credential_resolver;
pub mod department_service;
pub mod emergency;
pub mod search;
pub mod worker_service;

pub use birthday::{BirthdayWindow, MonthDay};
pub use credential_resolver::{
    CredentialResolver, IdentityError, IdentityProvider, Resolution, TokenVerifier,
};
pub use department_service::DepartmentService;
pub use emergency::EmergencyListing;
pub use search::{SearchQuery, WorkerFilter};
pub use worker_service::WorkerService;
