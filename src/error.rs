//! Error types for the Savora client.
//!
//! All failures surfaced by the gateway and the auth coordinator collapse
//! into [`ApiError`]. Variants carry owned strings rather than source errors
//! so a single recovery failure can be fanned out to every queued call.

use thiserror::Error;

/// Errors surfaced by [`crate::gateway::ApiClient`] and the auth coordinator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Transport-level failure. The coordinator never retries these
    /// automatically; the caller may retry manually.
    #[error("network error: {0}")]
    Network(String),

    /// The login exchange was declined (no usable session was established),
    /// or the platform login primitive itself failed. Terminal for that
    /// login attempt; any stale credential is cleared.
    #[error("login rejected: {0}")]
    AuthRejected(String),

    /// The server reported the refresh token itself as invalid or expired.
    /// Triggers fallback to a full login; never surfaced to callers directly
    /// unless the fallback also fails.
    #[error("refresh token rejected: {0}")]
    RefreshRejected(String),

    /// A replayed call still received 401 after a successful recovery.
    /// Terminal: the session is cleared and the caller must re-initiate login.
    #[error("session expired")]
    SessionExpired,

    /// Any other non-2xx response on an authenticated call, passed through
    /// untouched. The gateway does not interpret business-level payloads.
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

impl ApiError {
    /// Whether re-authenticating could resolve this error.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired | ApiError::AuthRejected(_) | ApiError::RefreshRejected(_)
        )
    }

    /// Whether the caller may reasonably retry the original call as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::ServerError {
                    status: 500..=599,
                    ..
                }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::AuthRejected(_) => "Sign-in was not completed. Please try again.".to_string(),
            ApiError::RefreshRejected(_) | ApiError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::ServerError { message, .. } => {
                if message.is_empty() {
                    "The request failed. Please try again later.".to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

impl From<crate::traits::HttpError> for ApiError {
    fn from(err: crate::traits::HttpError) -> Self {
        ApiError::Network(err.to_string())
    }
}
