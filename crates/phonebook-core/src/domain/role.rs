// ============================================================================
// Phonebook Core - Role
// File: crates/phonebook-core/src/domain/role.rs
// Description: Per-request authorization role, never persisted
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Subject identifier issued by the SSO service (`uid` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role enumeration, ordered `Guest < User < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Checks that this role is at least `required`.
    ///
    /// A guest gets `Unauthorized` (credentials would help), an
    /// authenticated role below the requirement gets `Forbidden`.
    pub fn require(self, required: Role, action: &str) -> Result<(), DomainError> {
        if self >= required {
            return Ok(());
        }
        match self {
            Role::Guest => Err(DomainError::Unauthorized(format!(
                "authentication required to {}",
                action
            ))),
            _ => Err(DomainError::Forbidden(format!(
                "{} role required to {}",
                required.as_str(),
                action
            ))),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Guest
    }
}
