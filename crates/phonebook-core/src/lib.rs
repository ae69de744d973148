//! # Phonebook Core
//! 
//! Domain entities, tenant routing, credential resolution, repository traits
//! and the directory services that every entry point goes through.

pub mod context;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;
pub mod tenancy;

// Re-export domain entities
pub use context::RequestContext;
pub use domain::*;
pub use error::DomainError;
pub use tenancy::{Partition, TenantRouter};
