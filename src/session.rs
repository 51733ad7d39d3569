//! Session persistence
//!
//! The logged-in user id and the "onboarding form submitted" flag survive
//! restarts in a small JSON file. The session is loaded once at startup and
//! passed to whatever needs it; nothing else touches the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Client session context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub form_submitted: bool,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// The logged-in user id, or an error telling the caller to log in
    pub fn require_user(&self) -> Result<&str, SessionError> {
        self.user_id.as_deref().ok_or(SessionError::NotLoggedIn)
    }
}

/// Durable key-value storage for the session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing or unreadable file is an empty session.
    pub fn load(&self) -> Session {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Session::default(),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read session file");
                return Session::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Discarding corrupt session file");
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = ?self.path, "Session saved");
        Ok(())
    }

    /// Remove the stored session (logout)
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session storage errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not logged in")]
    NotLoggedIn,
}
