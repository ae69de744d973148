//! # Phonebook Security
//! 
//! Bearer credential handling: header parsing and SSO token validation.

pub mod bearer;
pub mod jwt;

pub use bearer::extract_bearer;
pub use jwt::{Claims, JwtError, JwtService};
