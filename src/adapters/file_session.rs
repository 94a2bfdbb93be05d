//! File-based session store.
//!
//! Persists the session as JSON at `~/.savora/.session.json`. All failure
//! modes degrade gracefully: a missing or corrupt file loads as "no
//! session", and save/clear report success as a boolean.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::auth::credentials::StoredSession;
use crate::traits::SessionStore;

/// The session directory name.
const SESSION_DIR: &str = ".savora";

/// The session file name.
const SESSION_FILE: &str = ".session.json";

/// File-backed [`SessionStore`] implementation.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    /// Path to the session file.
    session_path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at the default location under the home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let session_path = home.join(SESSION_DIR).join(SESSION_FILE);
        Some(Self { session_path })
    }

    /// Create a store at a custom path.
    pub fn with_path(session_path: PathBuf) -> Self {
        Self { session_path }
    }

    /// Get the path to the session file.
    pub fn session_path(&self) -> &PathBuf {
        &self.session_path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<StoredSession> {
        if !self.session_path.exists() {
            return None;
        }

        let file = File::open(&self.session_path).ok()?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).ok()
    }

    fn save(&self, session: &StoredSession) -> bool {
        if let Some(parent) = self.session_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.session_path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, session).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }

    fn clear(&self) -> bool {
        if !self.session_path.exists() {
            return true;
        }

        fs::remove_file(&self.session_path).is_ok()
    }
}
