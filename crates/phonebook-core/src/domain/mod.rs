//! # Phonebook Core - Domain Module
//! 
//! Domain entities for the directory.

pub mod department;
pub mod role;
pub mod service;
pub mod worker;

// Re-export all entities and enums
pub use department::{Department, DepartmentDraft, Section};
pub use role::{Role, SubjectId};
pub use service::EmergencyService;
pub use worker::{Worker, WorkerProfile};
