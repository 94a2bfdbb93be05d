//! Wire types and request descriptors shared across the client.

use serde::{Deserialize, Serialize};

/// Standard response envelope returned by the Savora API.
///
/// Every endpoint wraps its payload as `{ success, data, message }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    /// Bearer access token for subsequent calls.
    pub token: String,
    /// Refresh token, when the server issues one.
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: Option<String>,
    /// The authenticated user's profile.
    #[serde(default)]
    pub user: Option<Profile>,
}

/// Cached user profile returned on login/refresh.
///
/// Advisory only: display data and preferences, never consulted for
/// authorization decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub preferred_cuisines: Vec<String>,
}

/// Optional profile data forwarded with the login exchange.
///
/// The platform may decline to provide this (the user can refuse the
/// profile prompt); login proceeds without it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileHint {
    pub nick_name: String,
    pub avatar_url: String,
}

/// HTTP method for an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// An outbound call captured at enqueue time.
///
/// The descriptor carries everything needed to dispatch (or replay) the
/// call; the access token is deliberately not part of it and is read only
/// at the moment of dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/recipes`.
    pub path: String,
    /// JSON body for POST/PUT calls.
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}
