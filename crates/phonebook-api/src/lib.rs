//! # Phonebook API
//!
//! HTTP surface: router, role-resolution middleware, handlers, response
//! envelope and error-to-status mapping.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
