//! Authentication for the Savora client.
//!
//! This module provides:
//! - Credential pair and persisted session types
//! - The credential exchanger (login-code and refresh-token exchanges)
//! - The auth coordinator: state machine, single-flight gate, and replay queue

pub mod coordinator;
pub mod credentials;
pub mod exchanger;

pub use coordinator::{AuthCoordinator, AuthState};
pub use credentials::{Credentials, StoredSession};
pub use exchanger::{AuthExchange, CredentialExchanger};
