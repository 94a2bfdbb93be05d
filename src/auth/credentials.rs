//! Credential pair and persisted session types.

use serde::{Deserialize, Serialize};

use crate::models::Profile;

/// The access/refresh token pair identifying an authenticated session.
///
/// Tokens are opaque bearer strings; the client never decodes them. Expiry
/// is only ever observed through a 401 response, at which point the pair is
/// considered stale and must not be attached to further calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Bearer access token attached to every authenticated call.
    pub access_token: String,
    /// Refresh token for renewing the session without a full login.
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Check if the pair carries a refresh token.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// The session document persisted by a [`crate::traits::SessionStore`].
///
/// One JSON object holding the credential pair plus the cached profile,
/// written on every successful exchange and removed on terminal logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, rename = "user", skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl StoredSession {
    pub fn new(credentials: Credentials, profile: Option<Profile>) -> Self {
        Self {
            access_token: credentials.access_token,
            refresh_token: credentials.refresh_token,
            profile,
        }
    }

    /// Extract the credential pair.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("access", Some("refresh".to_string()));
        assert_eq!(creds.access_token, "access");
        assert_eq!(creds.refresh_token, Some("refresh".to_string()));
        assert!(creds.has_refresh_token());
    }

    #[test]
    fn test_credentials_without_refresh_token() {
        let creds = Credentials::new("access", None);
        assert!(!creds.has_refresh_token());
    }

    #[test]
    fn test_stored_session_round_trip() {
        let session = StoredSession::new(
            Credentials::new("access", Some("refresh".to_string())),
            Some(Profile {
                id: "user-1".to_string(),
                nickname: "cook".to_string(),
                avatar_url: String::new(),
                preferred_cuisines: vec!["Sichuan".to_string()],
            }),
        );

        let json = serde_json::to_string(&session).unwrap();
        let loaded: StoredSession = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.credentials().access_token, "access");
    }

    #[test]
    fn test_stored_session_profile_serialized_as_user() {
        let session = StoredSession::new(
            Credentials::new("access", None),
            Some(Profile::default()),
        );
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"user\""));
        assert!(!json.contains("\"refresh_token\""));
    }

    #[test]
    fn test_stored_session_backward_compatibility() {
        // Older session files carried extra fields; serde ignores them.
        let json = r#"{
            "access_token": "old-token",
            "refresh_token": "old-refresh",
            "user": {"id": "u1", "nickname": "", "avatarUrl": "", "preferredCuisines": []},
            "device_id": "legacy-field"
        }"#;

        let session: StoredSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "old-token");
        assert_eq!(session.refresh_token, Some("old-refresh".to_string()));
        assert_eq!(session.profile.unwrap().id, "u1");
    }

    #[test]
    fn test_stored_session_minimal() {
        let session: StoredSession = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(session.access_token, "t");
        assert!(session.refresh_token.is_none());
        assert!(session.profile.is_none());
    }
}
