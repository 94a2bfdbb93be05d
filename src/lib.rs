//! Savora client - network access layer for the Savora recipe platform.
//!
//! This crate issues outbound API calls under a bearer-token session, detects
//! credential expiry, recovers the session (token refresh or full re-login),
//! and replays affected calls. Concurrent callers share a single in-flight
//! recovery; see [`auth::AuthCoordinator`] for the state machine.

pub mod adapters;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod models;
pub mod traits;

pub use error::ApiError;
pub use gateway::ApiClient;
pub use models::{Method, RequestDescriptor};
