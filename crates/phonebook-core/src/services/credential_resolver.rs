// ============================================================================
// Phonebook Core - Credential Resolver
// File: crates/phonebook-core/src/services/credential_resolver.rs
// ============================================================================
//! Bearer credential -> role.
//!
//! - no credential, malformed header, invalid token: `Guest`
//! - valid token, identity service says admin: `Admin`
//! - valid token, identity service says not admin: `User`
//! - valid token, identity service errors: `User`, logged at `warn`
//!
//! Parse failures degrade to anonymous access, never to anything above it.

use std::sync::Arc;

use async_trait::async_trait;
use phonebook_security::{extract_bearer, JwtError, JwtService};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Role, SubjectId};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    #[error("Identity service timed out")]
    Timeout,

    #[error("Unexpected identity service response: {0}")]
    InvalidResponse(String),
}

impl IdentityError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_) | IdentityError::Timeout)
    }
}

/// Signature and claims check for a raw bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<SubjectId, JwtError>;
}

impl TokenVerifier for JwtService {
    fn verify(&self, token: &str) -> Result<SubjectId, JwtError> {
        self.validate_token(token).map(|claims| SubjectId(claims.uid))
    }
}

/// Admin-status lookup on the external identity service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn is_admin(&self, subject: SubjectId) -> Result<bool, IdentityError>;
}

/// Outcome of resolving one request's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub role: Role,
    pub subject: Option<SubjectId>,
}

impl Resolution {
    fn guest() -> Self {
        Self { role: Role::Guest, subject: None }
    }
}

pub struct CredentialResolver {
    verifier: Arc<dyn TokenVerifier>,
    identity: Arc<dyn IdentityProvider>,
}

impl CredentialResolver {
    pub fn new(verifier: Arc<dyn TokenVerifier>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { verifier, identity }
    }

    /// Resolves the `Authorization` header value of one request. Nothing is
    /// cached; the same input always goes through the full check again.
    pub async fn resolve(&self, authorization: Option<&str>) -> Resolution {
        let Some(header) = authorization else {
            debug!("no credential present, resolving as guest");
            return Resolution::guest();
        };

        let Some(token) = extract_bearer(header) else {
            debug!("malformed authorization header, resolving as guest");
            return Resolution::guest();
        };

        let subject = match self.verifier.verify(token) {
            Ok(subject) => subject,
            Err(e) => {
                debug!(error = %e, "credential rejected, resolving as guest");
                return Resolution::guest();
            }
        };

        let role = match self.identity.is_admin(subject).await {
            Ok(true) => Role::Admin,
            Ok(false) => Role::User,
            Err(e) => {
                warn!(
                    subject = %subject,
                    error = %e,
                    "admin-status lookup failed, degrading to user role"
                );
                Role::User
            }
        };

        debug!(subject = %subject, role = role.as_str(), "credential resolved");
        Resolution { role, subject: Some(subject) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn resolver(verifier: MockTokenVerifier, identity: MockIdentityProvider) -> CredentialResolver {
        CredentialResolver::new(Arc::new(verifier), Arc::new(identity))
    }

    fn valid_verifier(uid: i64) -> MockTokenVerifier {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().returning(move |_| Ok(SubjectId(uid)));
        verifier
    }

    #[tokio::test]
    async fn test_no_header_is_guest() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_is_admin().never();
        let resolution = resolver(MockTokenVerifier::new(), identity).resolve(None).await;
        assert_eq!(resolution, Resolution { role: Role::Guest, subject: None });
    }

    #[tokio::test]
    async fn test_malformed_scheme_is_guest() {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().never();
        let mut identity = MockIdentityProvider::new();
        identity.expect_is_admin().never();
        let resolver = resolver(verifier, identity);
        for header in ["Basic abc", "Token abc", "Bearer", "abc.def.ghi"] {
            assert_eq!(resolver.resolve(Some(header)).await.role, Role::Guest, "{}", header);
        }
    }

    #[tokio::test]
    async fn test_invalid_token_fails_open_to_guest_not_higher() {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(JwtError::ValidationError("bad signature".into())));
        let mut identity = MockIdentityProvider::new();
        identity.expect_is_admin().never();
        let resolution = resolver(verifier, identity).resolve(Some("Bearer forged")).await;
        assert_eq!(resolution.role, Role::Guest);
        assert_eq!(resolution.subject, None);
    }

    #[tokio::test]
    async fn test_admin_lookup_true_is_admin() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_is_admin()
            .with(eq(SubjectId(7)))
            .times(1)
            .returning(|_| Ok(true));
        let resolution = resolver(valid_verifier(7), identity).resolve(Some("Bearer t")).await;
        assert_eq!(resolution, Resolution { role: Role::Admin, subject: Some(SubjectId(7)) });
    }

    #[tokio::test]
    async fn test_admin_lookup_false_is_user() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_is_admin().times(1).returning(|_| Ok(false));
        let resolution = resolver(valid_verifier(8), identity).resolve(Some("Bearer t")).await;
        assert_eq!(resolution.role, Role::User);
    }

    #[tokio::test]
    async fn test_lookup_error_degrades_to_user_never_admin_or_guest() {
        for error in [
            IdentityError::Timeout,
            IdentityError::Unavailable("connection refused".into()),
            IdentityError::InvalidResponse("garbage".into()),
        ] {
            let mut identity = MockIdentityProvider::new();
            let mut error = Some(error);
            identity
                .expect_is_admin()
                .times(1)
                .returning(move |_| Err(error.take().unwrap_or(IdentityError::Timeout)));
            let resolution = resolver(valid_verifier(9), identity).resolve(Some("Bearer t")).await;
            assert_eq!(resolution.role, Role::User);
            assert_eq!(resolution.subject, Some(SubjectId(9)));
        }
    }

    #[tokio::test]
    async fn test_resolution_is_not_cached() {
        let mut identity = MockIdentityProvider::new();
        let mut answers = vec![Ok(true), Ok(false)].into_iter();
        identity
            .expect_is_admin()
            .times(2)
            .returning(move |_| answers.next().unwrap_or(Ok(false)));
        let resolver = resolver(valid_verifier(3), identity);
        assert_eq!(resolver.resolve(Some("Bearer t")).await.role, Role::Admin);
        assert_eq!(resolver.resolve(Some("Bearer t")).await.role, Role::User);
    }

    #[tokio::test]
    async fn test_real_jwt_service_as_verifier() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_token(11, None, 600).unwrap();
        let mut identity = MockIdentityProvider::new();
        identity.expect_is_admin().with(eq(SubjectId(11))).returning(|_| Ok(false));
        let resolver = CredentialResolver::new(Arc::new(jwt), Arc::new(identity));
        let header = format!("Bearer {}", token);
        assert_eq!(resolver.resolve(Some(&header)).await.role, Role::User);
    }
}
