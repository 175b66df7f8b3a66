//! File-backed token storage for the CLI.
//!
//! Impersonation needs a save/restore of the super-admin session, so
//! the store is an explicit two-slot holder: `current` is the token in
//! use, `saved` holds the previous super-admin session while an
//! impersonation is active. Starting an impersonation pushes the
//! current session into the saved slot; stopping pops it back. Popping
//! with an empty saved slot is the defined `NoSavedSession` state, not
//! an implicit null.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not logged in")]
    NoCurrentSession,

    #[error("no saved session to restore; log in again")]
    NoSavedSession,

    #[error("already impersonating; stop the current impersonation first")]
    AlreadyImpersonating,

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    /// Human-readable description shown in `auth status`.
    pub label: String,
    pub stored_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(token: String, label: String) -> Self {
        Self {
            token,
            label,
            stored_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionStore {
    pub current: Option<StoredSession>,
    pub saved: Option<StoredSession>,
}

impl SessionStore {
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn current(&self) -> Result<&StoredSession, SessionError> {
        self.current.as_ref().ok_or(SessionError::NoCurrentSession)
    }

    /// Replace the current session (login). Any saved session is
    /// dropped: a fresh login invalidates the old restore point.
    pub fn set_current(&mut self, session: StoredSession) {
        self.current = Some(session);
        self.saved = None;
    }

    /// Begin impersonating: the current session moves into the saved
    /// slot and the impersonation token becomes current.
    pub fn push_impersonation(&mut self, session: StoredSession) -> Result<(), SessionError> {
        if self.saved.is_some() {
            return Err(SessionError::AlreadyImpersonating);
        }
        let previous = self.current.take().ok_or(SessionError::NoCurrentSession)?;
        self.saved = Some(previous);
        self.current = Some(session);
        Ok(())
    }

    /// End impersonating: restore the saved session as current.
    ///
    /// With an empty saved slot the current (impersonation) token is
    /// still discarded, forcing a fresh login.
    pub fn pop_impersonation(&mut self) -> Result<&StoredSession, SessionError> {
        match self.saved.take() {
            Some(previous) => Ok(self.current.insert(previous)),
            None => {
                self.current = None;
                Err(SessionError::NoSavedSession)
            }
        }
    }

    pub fn logout(&mut self) {
        self.current = None;
        self.saved = None;
    }

    pub fn is_impersonating(&self) -> bool {
        self.saved.is_some()
    }
}

/// Default session file location, overridable for tests and scripts.
pub fn default_session_path() -> anyhow::Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("VOICEDESK_CLI_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir).join("session.json"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("voicedesk")
        .join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(label: &str) -> StoredSession {
        StoredSession::new(format!("token-{}", label), label.to_string())
    }

    #[test]
    fn push_saves_exactly_one_previous_session() {
        let mut store = SessionStore::default();
        store.set_current(session("super-admin"));

        store.push_impersonation(session("tenant-2")).unwrap();
        assert!(store.is_impersonating());
        assert_eq!(store.current().unwrap().label, "tenant-2");
        assert_eq!(store.saved.as_ref().unwrap().label, "super-admin");

        // Second push without a pop is refused.
        assert!(matches!(
            store.push_impersonation(session("tenant-3")),
            Err(SessionError::AlreadyImpersonating)
        ));
    }

    #[test]
    fn pop_restores_the_saved_session() {
        let mut store = SessionStore::default();
        store.set_current(session("super-admin"));
        store.push_impersonation(session("tenant-2")).unwrap();

        let restored = store.pop_impersonation().unwrap();
        assert_eq!(restored.label, "super-admin");
        assert!(!store.is_impersonating());
    }

    #[test]
    fn pop_without_saved_session_forces_fresh_login() {
        let mut store = SessionStore::default();
        store.set_current(session("tenant-2"));

        assert!(matches!(
            store.pop_impersonation(),
            Err(SessionError::NoSavedSession)
        ));
        // The orphaned impersonation token is gone too.
        assert!(store.current.is_none());
    }

    #[test]
    fn push_without_login_is_an_error() {
        let mut store = SessionStore::default();
        assert!(matches!(
            store.push_impersonation(session("tenant-2")),
            Err(SessionError::NoCurrentSession)
        ));
    }

    #[test]
    fn fresh_login_drops_the_restore_point() {
        let mut store = SessionStore::default();
        store.set_current(session("super-admin"));
        store.push_impersonation(session("tenant-2")).unwrap();

        store.set_current(session("relogin"));
        assert!(!store.is_impersonating());
        assert_eq!(store.current().unwrap().label, "relogin");
    }

    #[test]
    fn store_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::default();
        store.set_current(session("super-admin"));
        store.push_impersonation(session("tenant-2")).unwrap();
        store.save(&path).unwrap();

        let loaded = SessionStore::load(&path).unwrap();
        assert_eq!(loaded.current.unwrap().label, "tenant-2");
        assert_eq!(loaded.saved.unwrap().label, "super-admin");
    }

    #[test]
    fn missing_file_loads_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(&dir.path().join("absent.json")).unwrap();
        assert!(store.current.is_none());
        assert!(store.saved.is_none());
    }
}
