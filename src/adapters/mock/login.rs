//! Static login provider for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::ApiError;
use crate::models::ProfileHint;
use crate::traits::{LoginCode, LoginProvider};

/// [`LoginProvider`] that returns a canned one-time code.
///
/// Counts how often it is invoked so tests can assert the single-flight
/// property of the coordinator.
#[derive(Debug, Clone)]
pub struct StaticLoginProvider {
    code: String,
    profile_hint: Option<ProfileHint>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl StaticLoginProvider {
    /// Provider that always yields the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile_hint: None,
            failure: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Provider that also supplies a profile hint.
    pub fn with_profile_hint(code: impl Into<String>, hint: ProfileHint) -> Self {
        Self {
            profile_hint: Some(hint),
            ..Self::new(code)
        }
    }

    /// Provider that always fails, as when the user declines the prompt.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new("")
        }
    }

    /// Number of times a code was requested.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl LoginProvider for StaticLoginProvider {
    async fn obtain_login_code(&self) -> Result<LoginCode, ApiError> {
        *self.calls.lock().unwrap() += 1;
        match &self.failure {
            Some(message) => Err(ApiError::AuthRejected(message.clone())),
            None => Ok(LoginCode {
                code: self.code.clone(),
                profile_hint: self.profile_hint.clone(),
            }),
        }
    }
}
