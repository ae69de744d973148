//! # Phonebook Infrastructure
//!
//! Storage and identity-service adapters for the core ports.

pub mod database;
pub mod identity;
pub mod memory;

pub use database::{
    create_pool, PgCompositeWriter, PgDepartmentRepository, PgServiceRepository, PgWorkerRepository,
};
pub use identity::HttpIdentityClient;
pub use memory::MemoryDirectory;
