//! Mock implementations for testing.
//!
//! Test doubles for the client's external collaborators:
//! - [`MockHttpClient`] - configurable HTTP responses with request recording
//! - [`InMemorySessionStore`] - session persistence without a file system
//! - [`StaticLoginProvider`] - canned platform login codes

pub mod http;
pub mod login;
pub mod session;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use login::StaticLoginProvider;
pub use session::InMemorySessionStore;
