//! PostgreSQL repository implementations
//!
//! Every statement names its tables through [`Partition::qualify`], so no
//! connection-level schema state is ever set or relied upon.
//!
//! [`Partition::qualify`]: phonebook_core::Partition::qualify

mod errors;

pub mod composite_writer_impl;
pub mod department_repo_impl;
pub mod service_repo_impl;
pub mod worker_repo_impl;

pub use composite_writer_impl::PgCompositeWriter;
pub use department_repo_impl::PgDepartmentRepository;
pub use service_repo_impl::PgServiceRepository;
pub use worker_repo_impl::PgWorkerRepository;
