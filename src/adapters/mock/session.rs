//! In-memory session store for testing.
//!
//! Stores the session in memory, allowing tests to verify persistence
//! behavior without touching the file system.

use std::sync::{Arc, Mutex};

use crate::auth::credentials::StoredSession;
use crate::traits::SessionStore;

/// In-memory [`SessionStore`] implementation for testing.
///
/// Clones share the same underlying storage, so a test can hand the store
/// to the coordinator and still inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    /// Stored session
    session: Arc<Mutex<Option<StoredSession>>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Number of save calls observed
    save_count: Arc<Mutex<usize>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an initial session.
    pub fn with_session(session: StoredSession) -> Self {
        let store = Self::default();
        store.set_session(Some(session));
        store
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Get the current session synchronously (for assertions).
    pub fn get_session(&self) -> Option<StoredSession> {
        self.session.lock().unwrap().clone()
    }

    /// Set the session synchronously (for test setup).
    pub fn set_session(&self, session: Option<StoredSession>) {
        *self.session.lock().unwrap() = session;
    }

    /// Number of successful or attempted saves.
    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Option<StoredSession> {
        self.session.lock().unwrap().clone()
    }

    fn save(&self, session: &StoredSession) -> bool {
        *self.save_count.lock().unwrap() += 1;
        if *self.save_should_fail.lock().unwrap() {
            return false;
        }
        *self.session.lock().unwrap() = Some(session.clone());
        true
    }

    fn clear(&self) -> bool {
        *self.session.lock().unwrap() = None;
        true
    }
}
