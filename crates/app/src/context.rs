//! Caller cancellation carried into every use-case and repository call.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use sensorhub_domain::error::HubError;

/// Cancellation signal plus an optional deadline.
///
/// Cloning shares the same token: cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context that is only cancelled through its [`token`](Self::token).
    #[must_use]
    pub fn new() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Wrap an existing token, e.g. a child of the server shutdown token.
    #[must_use]
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Bound this context by `timeout` from now, keeping any earlier deadline.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound this context by `deadline`, keeping any earlier deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// The underlying token.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail fast if the caller has given up.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Cancelled`] once the token is cancelled, or
    /// [`HubError::DeadlineExceeded`] once the deadline has passed.
    pub fn check(&self) -> Result<(), HubError> {
        if self.token.is_cancelled() {
            return Err(HubError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(HubError::DeadlineExceeded);
        }
        Ok(())
    }
}
