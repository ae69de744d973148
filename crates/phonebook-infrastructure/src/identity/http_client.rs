// ============================================================================
// Phonebook Infrastructure - Identity Service Client
// File: crates/phonebook-infrastructure/src/identity/http_client.rs
// ============================================================================
//! `IsAdmin(subject)` over HTTP: `GET {base_url}/api/v1/users/{uid}/is-admin`
//! answering `{"is_admin": bool}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use phonebook_core::services::credential_resolver::{IdentityError, IdentityProvider};
use phonebook_core::SubjectId;
use phonebook_shared::config::IdentitySettings;

const RETRY_BACKOFF_MS: u64 = 50;

#[derive(Debug, Deserialize)]
struct IsAdminResponse {
    is_admin: bool,
}

pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
    retries: u32,
}

impl HttpIdentityClient {
    pub fn new(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retries: settings.retries,
        })
    }

    async fn fetch(&self, subject: SubjectId) -> Result<bool, IdentityError> {
        let url = format!("{}/api/v1/users/{}/is-admin", self.base_url, subject);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                IdentityError::Timeout
            } else {
                IdentityError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IdentityError::Unavailable(format!("status {}", status)));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidResponse(format!("status {}", status)));
        }

        let body: IsAdminResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                IdentityError::Timeout
            } else {
                IdentityError::InvalidResponse(e.to_string())
            }
        })?;
        Ok(body.is_admin)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityClient {
    async fn is_admin(&self, subject: SubjectId) -> Result<bool, IdentityError> {
        let mut attempt = 0;
        loop {
            match self.fetch(subject).await {
                Ok(is_admin) => {
                    debug!(subject = %subject, is_admin, "admin status fetched");
                    return Ok(is_admin);
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(subject = %subject, attempt, error = %e, "identity lookup failed, retrying");
                    sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
