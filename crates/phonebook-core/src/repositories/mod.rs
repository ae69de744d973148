//! Repository traits (ports)

pub mod composite_writer;
pub mod department_repository;
pub mod service_repository;
pub mod worker_repository;

pub use composite_writer::CompositeWriter;
pub use department_repository::DepartmentRepository;
pub use service_repository::ServiceRepository;
pub use worker_repository::WorkerRepository;
