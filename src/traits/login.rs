//! Platform login primitive trait abstraction.
//!
//! The platform supplies a one-time exchange code (and optionally profile
//! data) that the credential exchanger trades for a session. The primitive's
//! own failure (user declines, platform error) surfaces as
//! [`ApiError::AuthRejected`] without contacting the remote API.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::ProfileHint;

/// A one-time login code with an optional profile hint.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginCode {
    /// Opaque one-time code consumed by the login exchange.
    pub code: String,
    /// Profile data the user agreed to share, if any.
    pub profile_hint: Option<ProfileHint>,
}

impl LoginCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile_hint: None,
        }
    }

    pub fn with_profile_hint(code: impl Into<String>, hint: ProfileHint) -> Self {
        Self {
            code: code.into(),
            profile_hint: Some(hint),
        }
    }
}

/// Trait for the platform login primitive.
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Obtain a one-time exchange code from the platform.
    ///
    /// # Returns
    /// - `Ok(code)` when the platform produced a code
    /// - `Err(ApiError::AuthRejected)` when the user declined or the
    ///   platform failed
    async fn obtain_login_code(&self) -> Result<LoginCode, ApiError>;
}
