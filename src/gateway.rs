//! Public call surface for the Savora API.
//!
//! [`ApiClient`] is the one entry point the rest of the application uses:
//! it attaches the current credential at the moment of dispatch, delegates
//! 401 handling to the [`AuthCoordinator`], and performs at most one replay
//! per original call. Everything else (pagination, rendering, business
//! payloads) lives with the caller.

use std::sync::Arc;

use crate::adapters::{FileSessionStore, ReqwestHttpClient};
use crate::auth::{AuthCoordinator, AuthState};
use crate::error::ApiError;
use crate::models::{Profile, RequestDescriptor};
use crate::traits::{HttpClient, LoginProvider, Response, SessionStore};

/// Client for the Savora API with transparent session recovery.
pub struct ApiClient {
    coordinator: Arc<AuthCoordinator>,
}

impl ApiClient {
    /// Create a client with the production adapters (reqwest, file-backed
    /// session store).
    ///
    /// Returns `None` if the home directory cannot be determined for the
    /// session store.
    pub fn new(base_url: impl Into<String>, login: Arc<dyn LoginProvider>) -> Option<Self> {
        let store = FileSessionStore::new()?;
        Some(Self::with_components(
            base_url,
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(store),
            login,
        ))
    }

    /// Create a client with explicit components, for tests or custom wiring.
    pub fn with_components(
        base_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionStore>,
        login: Arc<dyn LoginProvider>,
    ) -> Self {
        Self {
            coordinator: Arc::new(AuthCoordinator::new(base_url, http, store, login)),
        }
    }

    /// Issue a call under the current session.
    ///
    /// Triggers a login when no session exists, joins an in-flight recovery
    /// when one is running, and replays the call once after a 401-triggered
    /// recovery. Non-401 non-2xx responses surface as
    /// [`ApiError::ServerError`] without interpretation.
    pub async fn call(&self, descriptor: RequestDescriptor) -> Result<Response, ApiError> {
        self.coordinator.execute(descriptor).await
    }

    /// Convenience GET.
    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.call(RequestDescriptor::get(path)).await
    }

    /// Convenience POST with a JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Response, ApiError> {
        self.call(RequestDescriptor::post(path, body)).await
    }

    /// Convenience PUT with a JSON body.
    pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<Response, ApiError> {
        self.call(RequestDescriptor::put(path, body)).await
    }

    /// Convenience DELETE.
    pub async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        self.call(RequestDescriptor::delete(path)).await
    }

    /// Clear the session from memory and the store.
    pub async fn sign_out(&self) {
        self.coordinator.sign_out().await;
    }

    /// Cached profile from the last login or refresh. Advisory only.
    pub async fn profile(&self) -> Option<Profile> {
        self.coordinator.profile().await
    }

    /// Current auth state.
    pub async fn auth_state(&self) -> AuthState {
        self.coordinator.state().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{
        InMemorySessionStore, MockHttpClient, MockResponse, StaticLoginProvider,
    };
    use bytes::Bytes;

    fn client_with(mock: &MockHttpClient, store: &InMemorySessionStore) -> ApiClient {
        ApiClient::with_components(
            "http://api.test",
            Arc::new(mock.clone()),
            Arc::new(store.clone()),
            Arc::new(StaticLoginProvider::new("code")),
        )
    }

    fn authed_store() -> InMemorySessionStore {
        use crate::auth::{Credentials, StoredSession};
        InMemorySessionStore::with_session(StoredSession::new(
            Credentials::new("token", None),
            None,
        ))
    }

    #[tokio::test]
    async fn test_convenience_methods_use_descriptor() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::new(
            200,
            Bytes::from(r#"{"success": true}"#),
        )));
        let client = client_with(&mock, &authed_store());

        client.get("/recipes").await.unwrap();
        client
            .post("/favorites", serde_json::json!({"recipeId": "r1"}))
            .await
            .unwrap();
        client
            .put("/auth/preferences", serde_json::json!({"cuisines": ["Sichuan"]}))
            .await
            .unwrap();
        client.delete("/favorites/r1").await.unwrap();

        let methods: Vec<String> = mock
            .get_requests()
            .into_iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(methods, vec!["GET", "POST", "PUT", "DELETE"]);
    }

    #[tokio::test]
    async fn test_auth_state_and_sign_out() {
        let mock = MockHttpClient::new();
        let store = authed_store();
        let client = client_with(&mock, &store);

        assert_eq!(client.auth_state().await, AuthState::Authenticated);
        client.sign_out().await;
        assert_eq!(client.auth_state().await, AuthState::LoggedOut);
        assert!(store.get_session().is_none());
    }
}
