//! Session store trait abstraction.
//!
//! Durable key-value persistence of the current session. Store failures are
//! deliberately absorbed at this boundary: a corrupt or unreadable store
//! behaves as an absent session, never as a fatal error.

use crate::auth::credentials::StoredSession;

/// Trait for durable session persistence.
///
/// Implementations include the production file-based store and an in-memory
/// store for testing. `save` and `clear` report success as a boolean; the
/// coordinator logs failures but never propagates them.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session.
    ///
    /// Returns `None` when no session is stored or when the stored data
    /// cannot be read or parsed.
    fn load(&self) -> Option<StoredSession>;

    /// Persist the session. Returns `true` on success.
    fn save(&self, session: &StoredSession) -> bool;

    /// Remove any persisted session. Returns `true` on success or when
    /// nothing was stored.
    fn clear(&self) -> bool;
}
