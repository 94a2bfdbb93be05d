//! Credential exchanger for the Savora API.
//!
//! Performs the two external exchanges, each a single round trip:
//! - platform login code -> credential pair (`POST /auth/wechat-login`)
//! - refresh token -> renewed credential pair (`POST /auth/refresh`)
//!
//! The exchanger never guards against concurrent use; the coordinator's
//! single-flight gate guarantees at most one exchange is in flight.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::models::{ApiEnvelope, AuthPayload, Profile, ProfileHint};
use crate::traits::{Headers, HttpClient, Response};

use super::credentials::Credentials;

/// Path of the login exchange endpoint.
pub const LOGIN_PATH: &str = "/auth/wechat-login";

/// Path of the refresh exchange endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Outcome of a successful exchange: a fresh pair plus the server's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthExchange {
    pub credentials: Credentials,
    pub profile: Option<Profile>,
}

/// Client for the authentication endpoints of the Savora API.
pub struct CredentialExchanger {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl CredentialExchanger {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Exchange a one-time platform login code for a credential pair.
    ///
    /// # Returns
    /// - `Ok(exchange)` when the server established a session
    /// - `Err(ApiError::AuthRejected)` when no usable session was established
    /// - `Err(ApiError::Network)` on transport failure
    pub async fn exchange_login_code(
        &self,
        code: &str,
        profile_hint: Option<&ProfileHint>,
    ) -> Result<AuthExchange, ApiError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let body = serde_json::json!({
            "code": code,
            "userInfo": profile_hint,
        });

        debug!("exchanging login code");
        let response = self
            .http
            .post(&url, &body.to_string(), &Self::json_headers())
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::parse_exchange(&response).map_err(ApiError::AuthRejected)
    }

    /// Exchange a refresh token for a renewed credential pair.
    ///
    /// The refresh token is carried as a bearer credential. A server verdict
    /// that the token itself is invalid is terminal for the token
    /// (`RefreshRejected`, not retryable); transient server trouble maps to
    /// `Network` so the coordinator keeps the stale session.
    pub async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<AuthExchange, ApiError> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let mut headers = Self::json_headers();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", refresh_token),
        );

        debug!("exchanging refresh token");
        let response = self
            .http
            .post(&url, "{}", &headers)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status == 401 || response.status == 403 {
            return Err(ApiError::RefreshRejected(Self::envelope_message(
                &response,
                "refresh token rejected by server",
            )));
        }

        if response.status >= 500 {
            return Err(ApiError::Network(format!(
                "refresh endpoint returned status {}",
                response.status
            )));
        }

        Self::parse_exchange(&response).map_err(ApiError::RefreshRejected)
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Extract the credential pair from an exchange response.
    ///
    /// Returns the rejection message on any response that does not carry a
    /// usable token; the caller maps it to the operation's rejection variant.
    fn parse_exchange(response: &Response) -> Result<AuthExchange, String> {
        let envelope: ApiEnvelope<AuthPayload> = match response.json() {
            Ok(envelope) => envelope,
            Err(_) => {
                return Err(Self::envelope_message(
                    response,
                    &format!("exchange failed with status {}", response.status),
                ))
            }
        };

        if !envelope.success {
            return Err(envelope
                .message
                .unwrap_or_else(|| "no session established".to_string()));
        }

        match envelope.data {
            Some(payload) if !payload.token.is_empty() => Ok(AuthExchange {
                credentials: Credentials::new(payload.token, payload.refresh_token),
                profile: payload.user,
            }),
            _ => Err("exchange response carried no token".to_string()),
        }
    }

    /// Best-effort extraction of the server's message from a response body.
    fn envelope_message(response: &Response, fallback: &str) -> String {
        response
            .json::<ApiEnvelope<serde_json::Value>>()
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| fallback.to_string())
    }
}
