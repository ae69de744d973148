//! Request-scoped context threaded through every directory operation

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Role, SubjectId};
use crate::error::DomainError;

/// Who is asking, and for how long they are willing to wait.
///
/// Built once per inbound request (role comes from the credential
/// resolver) and passed explicitly; nothing here outlives the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub role: Role,
    pub subject: Option<SubjectId>,
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl RequestContext {
    pub fn new(role: Role, subject: Option<SubjectId>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            role,
            subject,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn guest() -> Self {
        Self::new(Role::Guest, None)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drives `operation` until it completes, the token is cancelled, or the
    /// deadline passes. On cancellation the operation future is dropped, which
    /// rolls back any transaction it had open.
    pub async fn run<T, F>(&self, op: &'static str, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!(op, request_id = %self.request_id, "operation cancelled");
                    Err(DomainError::Cancelled)
                }
                result = operation => result,
            }
        };

        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, guarded).await.unwrap_or_else(|_| {
                warn!(op, request_id = %self.request_id, ?limit, "operation deadline exceeded");
                Err(DomainError::DeadlineExceeded)
            }),
            None => guarded.await,
        }
    }
}
