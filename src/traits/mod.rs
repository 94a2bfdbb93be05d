//! Trait abstractions for dependency injection and testability.
//!
//! This module provides trait-based abstractions for the client's external
//! collaborators, enabling dependency injection, mocking, and better
//! testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP operations against the remote API
//! - [`SessionStore`] - durable persistence of the credential pair
//! - [`LoginProvider`] - the platform login primitive (one-time codes)

pub mod http;
pub mod login;
pub mod session;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use login::{LoginCode, LoginProvider};
pub use session::SessionStore;
