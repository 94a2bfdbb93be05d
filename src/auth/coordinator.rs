//! Auth coordinator: session state machine and single-flight recovery gate.
//!
//! The coordinator owns the auth state, the current credential pair, the
//! cached profile, and the queue of calls waiting on an in-flight recovery.
//! All four live behind one async mutex; the mutex is never held across a
//! network await. Mutual exclusion for the exchange itself comes from the
//! state machine: the transition out of `Authenticated`/`LoggedOut` elects
//! exactly one recovery driver, and every other caller appends a waiter that
//! is settled when the attempt resolves.
//!
//! Replay policy: queued calls are replayed in arrival order, each at most
//! once, with the token read at the moment of replay. A replay that still
//! receives 401 settles with `SessionExpired` and clears the session when
//! the rejected token is still the current one; it is never re-queued.

use std::mem;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::{ApiEnvelope, Method, Profile, RequestDescriptor};
use crate::traits::{Headers, HttpClient, LoginProvider, Response, SessionStore};

use super::credentials::{Credentials, StoredSession};
use super::exchanger::{AuthExchange, CredentialExchanger};

/// Authentication lifecycle states. Exactly one is current at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No session; resting state awaiting the next call.
    LoggedOut,
    /// A full login exchange is in flight.
    Authenticating,
    /// A credential pair is current; calls dispatch directly.
    Authenticated,
    /// A refresh exchange is in flight.
    Refreshing,
}

/// A call that arrived while recovery was in flight. Settled exactly once.
struct PendingCall {
    descriptor: RequestDescriptor,
    responder: oneshot::Sender<Result<Response, ApiError>>,
}

/// What the elected recovery driver should attempt first.
enum RecoveryMode {
    Refresh(String),
    Login,
}

/// How a call entering the coordinator proceeds, decided under the lock.
enum Route {
    /// Dispatch immediately with this access token.
    Dispatch(String),
    /// Recovery already in flight; wait for settlement.
    Wait(oneshot::Receiver<Result<Response, ApiError>>),
    /// This caller was elected recovery driver.
    Drive(oneshot::Receiver<Result<Response, ApiError>>, RecoveryMode),
}

struct CoordinatorInner {
    state: AuthState,
    credentials: Option<Credentials>,
    profile: Option<Profile>,
    queue: Vec<PendingCall>,
}

/// The state machine and single-flight gate around the credential exchanger.
pub struct AuthCoordinator {
    inner: Mutex<CoordinatorInner>,
    exchanger: CredentialExchanger,
    login: Arc<dyn LoginProvider>,
    store: Arc<dyn SessionStore>,
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl AuthCoordinator {
    /// Create a coordinator, restoring any persisted session.
    ///
    /// When the store holds a session the coordinator starts `Authenticated`
    /// and the first call dispatches without a login.
    pub fn new(
        base_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionStore>,
        login: Arc<dyn LoginProvider>,
    ) -> Self {
        let base_url = base_url.into();
        let restored = store.load();
        let (state, credentials, profile) = match restored {
            Some(session) => {
                info!("restored persisted session");
                (
                    AuthState::Authenticated,
                    Some(session.credentials()),
                    session.profile,
                )
            }
            None => (AuthState::LoggedOut, None, None),
        };

        Self {
            inner: Mutex::new(CoordinatorInner {
                state,
                credentials,
                profile,
                queue: Vec::new(),
            }),
            exchanger: CredentialExchanger::new(base_url.clone(), Arc::clone(&http)),
            login,
            store,
            http,
            base_url,
        }
    }

    /// Current auth state.
    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state
    }

    /// Cached profile from the last login or refresh.
    pub async fn profile(&self) -> Option<Profile> {
        self.inner.lock().await.profile.clone()
    }

    /// Issue an outbound call under the current session.
    ///
    /// Routes per the state machine: dispatch directly when `Authenticated`,
    /// start a login when `LoggedOut`, or join the pending queue while a
    /// recovery is in flight. A 401 on a direct dispatch hands the call back
    /// to the recovery path, where it is replayed at most once.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Response, ApiError> {
        let route = {
            let mut inner = self.inner.lock().await;
            match (inner.state, inner.credentials.clone()) {
                (AuthState::Authenticated, Some(credentials)) => {
                    Route::Dispatch(credentials.access_token)
                }
                (AuthState::Authenticating, _) | (AuthState::Refreshing, _) => {
                    Route::Wait(Self::enqueue(&mut inner, descriptor.clone()))
                }
                // LoggedOut (an Authenticated state without credentials
                // cannot arise; treat it the same way).
                _ => {
                    let rx = Self::enqueue(&mut inner, descriptor.clone());
                    inner.state = AuthState::Authenticating;
                    info!("no session; starting login");
                    Route::Drive(rx, RecoveryMode::Login)
                }
            }
        };

        match route {
            Route::Dispatch(token) => {
                let response = self.dispatch(&descriptor, &token).await?;
                if response.status == 401 {
                    debug!(path = %descriptor.path, "call received 401; entering recovery");
                    self.recover_after_unauthorized(descriptor).await
                } else {
                    Self::finalize(response)
                }
            }
            Route::Wait(rx) => Self::await_settlement(rx).await,
            Route::Drive(rx, mode) => {
                self.run_recovery(mode).await;
                Self::await_settlement(rx).await
            }
        }
    }

    /// Clear the session from memory and the store.
    pub async fn sign_out(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.credentials = None;
            inner.profile = None;
            inner.state = AuthState::LoggedOut;
        }
        if !self.store.clear() {
            warn!("failed to clear persisted session");
        }
        info!("signed out");
    }

    /// Route a call whose direct dispatch came back 401.
    async fn recover_after_unauthorized(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<Response, ApiError> {
        let (rx, drive_mode) = {
            let mut inner = self.inner.lock().await;
            let rx = Self::enqueue(&mut inner, descriptor);
            match inner.state {
                AuthState::Authenticating | AuthState::Refreshing => {
                    // Another call's 401 won the race; join its recovery.
                    (rx, None)
                }
                _ => {
                    let refresh_token = inner
                        .credentials
                        .as_ref()
                        .and_then(|c| c.refresh_token.clone());
                    let mode = match refresh_token {
                        Some(token) => {
                            inner.state = AuthState::Refreshing;
                            info!("access token stale; refreshing session");
                            RecoveryMode::Refresh(token)
                        }
                        None => {
                            inner.state = AuthState::Authenticating;
                            info!("access token stale and no refresh token; starting login");
                            RecoveryMode::Login
                        }
                    };
                    (rx, Some(mode))
                }
            }
        };

        if let Some(mode) = drive_mode {
            self.run_recovery(mode).await;
        }
        Self::await_settlement(rx).await
    }

    /// Drive one recovery attempt to completion, including the fallback from
    /// a rejected refresh token to a full login. Runs on the elected driver's
    /// task; every queued waiter is settled before this returns.
    async fn run_recovery(&self, mut mode: RecoveryMode) {
        loop {
            let attempt = match &mode {
                RecoveryMode::Refresh(refresh_token) => {
                    self.exchanger.exchange_refresh_token(refresh_token).await
                }
                RecoveryMode::Login => match self.login.obtain_login_code().await {
                    Ok(login_code) => {
                        self.exchanger
                            .exchange_login_code(&login_code.code, login_code.profile_hint.as_ref())
                            .await
                    }
                    Err(err) => Err(err),
                },
            };

            match attempt {
                Ok(exchange) => {
                    self.complete_recovery(exchange).await;
                    return;
                }
                Err(ApiError::RefreshRejected(message))
                    if matches!(mode, RecoveryMode::Refresh(_)) =>
                {
                    // Terminal for the refresh token, not for the session:
                    // fall back to a full login with the queue carried forward.
                    warn!("refresh token rejected ({message}); falling back to full login");
                    self.inner.lock().await.state = AuthState::Authenticating;
                    mode = RecoveryMode::Login;
                }
                Err(err) => {
                    self.fail_recovery(err).await;
                    return;
                }
            }
        }
    }

    /// Install the fresh credential pair, persist it, and replay the queue
    /// in arrival order.
    ///
    /// The access token is re-read under the lock before each replay: while
    /// earlier replays are in flight the pair may be swapped by a newer
    /// recovery or removed by `sign_out`, and a replay must carry whatever
    /// pair is current at its own dispatch.
    async fn complete_recovery(&self, exchange: AuthExchange) {
        let (queue, profile) = {
            let mut inner = self.inner.lock().await;
            inner.credentials = Some(exchange.credentials.clone());
            if exchange.profile.is_some() {
                inner.profile = exchange.profile.clone();
            }
            inner.state = AuthState::Authenticated;
            (mem::take(&mut inner.queue), inner.profile.clone())
        };

        let session = StoredSession::new(exchange.credentials, profile);
        if !self.store.save(&session) {
            warn!("failed to persist refreshed session");
        }

        info!(queued = queue.len(), "session recovered; replaying queued calls");

        let mut calls = queue.into_iter();
        for call in calls.by_ref() {
            let token = {
                let inner = self.inner.lock().await;
                inner.credentials.as_ref().map(|c| c.access_token.clone())
            };
            let Some(token) = token else {
                // Signed out mid-drain; nothing left to attach.
                let _ = call.responder.send(Err(ApiError::SessionExpired));
                continue;
            };

            let result = match self.dispatch(&call.descriptor, &token).await {
                Ok(response) if response.status == 401 => {
                    warn!(path = %call.descriptor.path, "replay still unauthorized");
                    let cleared = self.clear_session_if_current(&token).await;
                    let _ = call.responder.send(Err(ApiError::SessionExpired));
                    if cleared {
                        break;
                    }
                    // A newer pair was installed while this replay was in
                    // flight; later replays pick it up.
                    continue;
                }
                Ok(response) => Self::finalize(response),
                Err(err) => Err(err),
            };
            let _ = call.responder.send(result);
        }

        // With the session gone there is no credential to attach, and each
        // call may be replayed at most once; the remainder settles expired.
        for call in calls {
            let _ = call.responder.send(Err(ApiError::SessionExpired));
        }
    }

    /// Settle every queued waiter with the recovery failure.
    ///
    /// `AuthRejected` is terminal and clears the session. A network failure
    /// leaves any existing (stale) credential in place so a transient outage
    /// never forces a logout; the next call will hit 401 and retry recovery.
    async fn fail_recovery(&self, err: ApiError) {
        let (queue, clear_store) = {
            let mut inner = self.inner.lock().await;
            let clear_store = matches!(err, ApiError::AuthRejected(_));
            if clear_store {
                inner.credentials = None;
                inner.profile = None;
                inner.state = AuthState::LoggedOut;
            } else {
                inner.state = if inner.credentials.is_some() {
                    AuthState::Authenticated
                } else {
                    AuthState::LoggedOut
                };
            }
            (mem::take(&mut inner.queue), clear_store)
        };

        if clear_store && !self.store.clear() {
            warn!("failed to clear persisted session");
        }

        warn!(queued = queue.len(), error = %err, "session recovery failed");
        for call in queue {
            let _ = call.responder.send(Err(err.clone()));
        }
    }

    /// Clear the session only when the failed token is still the current
    /// one; a pair installed by a newer recovery stays untouched.
    async fn clear_session_if_current(&self, failed_token: &str) -> bool {
        let cleared = {
            let mut inner = self.inner.lock().await;
            match &inner.credentials {
                Some(credentials) if credentials.access_token == failed_token => {
                    inner.credentials = None;
                    inner.profile = None;
                    inner.state = AuthState::LoggedOut;
                    true
                }
                _ => false,
            }
        };
        if cleared && !self.store.clear() {
            warn!("failed to clear persisted session");
        }
        cleared
    }

    /// Dispatch a descriptor with the given access token.
    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        access_token: &str,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, descriptor.path);
        debug!(method = descriptor.method.as_str(), path = %descriptor.path, "dispatching");
        let mut headers = Headers::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", access_token),
        );

        let result = match descriptor.method {
            Method::Get => self.http.get(&url, &headers).await,
            Method::Delete => self.http.delete(&url, &headers).await,
            Method::Post | Method::Put => {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                let body = descriptor
                    .body
                    .as_ref()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "{}".to_string());
                if descriptor.method == Method::Post {
                    self.http.post(&url, &body, &headers).await
                } else {
                    self.http.put(&url, &body, &headers).await
                }
            }
        };

        result.map_err(ApiError::from)
    }

    /// Map a non-401 response onto the caller's result: 2xx passes through,
    /// anything else becomes `ServerError` with the envelope message.
    fn finalize(response: Response) -> Result<Response, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ApiEnvelope<serde_json::Value>>()
            .ok()
            .and_then(|envelope| envelope.message)
            .or_else(|| response.text().ok().filter(|t| !t.is_empty()))
            .unwrap_or_else(|| "request failed".to_string());
        Err(ApiError::ServerError {
            status: response.status,
            message,
        })
    }

    fn enqueue(
        inner: &mut CoordinatorInner,
        descriptor: RequestDescriptor,
    ) -> oneshot::Receiver<Result<Response, ApiError>> {
        let (tx, rx) = oneshot::channel();
        debug!(path = %descriptor.path, "queueing call until recovery settles");
        inner.queue.push(PendingCall {
            descriptor,
            responder: tx,
        });
        rx
    }

    async fn await_settlement(
        rx: oneshot::Receiver<Result<Response, ApiError>>,
    ) -> Result<Response, ApiError> {
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Network("recovery settled without a response".to_string())))
    }
}
