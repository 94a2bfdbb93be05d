//! Concrete implementations of trait abstractions.
//!
//! This module provides production-ready adapters implementing the traits
//! defined in `crate::traits`, plus test doubles under [`mock`].
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileSessionStore`] - file-based session persistence
//!
//! # Mock Implementations
//!
//! - [`mock::MockHttpClient`] - configurable HTTP responses with recording
//! - [`mock::InMemorySessionStore`] - in-memory session persistence
//! - [`mock::StaticLoginProvider`] - canned platform login codes

pub mod file_session;
pub mod mock;
pub mod reqwest_http;

pub use file_session::FileSessionStore;
pub use mock::{InMemorySessionStore, MockHttpClient, StaticLoginProvider};
pub use reqwest_http::ReqwestHttpClient;
