//! Session store: the local record of who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login flow writes a token + display name pair, the navigation guard
//! reads it on every transition, and the guard or logout clears it. The store
//! is injected as `Arc<dyn SessionStore>` rather than read from ambient
//! globals.
//!
//! DESIGN
//! ======
//! `Session` can only be built fully signed in or fully anonymous, so the
//! paired-presence rule holds by construction. `FileSessionStore` keeps an
//! in-memory copy for `read()` and persists through write-to-temp + rename so
//! a reload never sees half a pair.
//!
//! ERROR HANDLING
//! ==============
//! `read()` never fails. A missing or unparsable file loads as anonymous.
//! `write`/`clear` surface persistence failures and leave the in-memory copy
//! unchanged when the disk write fails.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token must not be empty")]
    EmptyToken,

    #[error("session file I/O failed at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    token: String,
    username: String,
}

/// Snapshot of the local session. Token and username are present together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { credentials: None }
    }

    /// Build a signed-in session. An empty token is treated as absent.
    #[must_use]
    pub fn signed_in(token: impl Into<String>, username: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            return Self::anonymous();
        }
        Self { credentials: Some(Credentials { token, username: username.into() }) }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.credentials.is_some()
    }
}

/// On-disk shape: two independently nullable slots.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SessionRecord {
    token: Option<String>,
    username: Option<String>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        match (record.token, record.username) {
            (Some(token), Some(username)) => Session::signed_in(token, username),
            _ => Session::anonymous(),
        }
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        match session.credentials {
            Some(Credentials { token, username }) => Self { token: Some(token), username: Some(username) },
            None => Self::default(),
        }
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Shared session record. Implementations must update both slots atomically.
pub trait SessionStore: Send + Sync {
    /// Current session snapshot.
    fn read(&self) -> Session;

    /// Replace the session with a signed-in pair.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for an empty token, or a
    /// persistence error if the record could not be saved.
    fn write(&self, token: &str, username: &str) -> Result<(), SessionError>;

    /// Reset both slots to absent.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the record could not be saved.
    fn clear(&self) -> Result<(), SessionError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store with no durability.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { inner: Mutex::new(session) }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Session {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, token: &str, username: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Session::signed_in(token, username);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Session::anonymous();
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-file backed store that survives process restarts.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cached: Mutex<Session>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any previously persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = load(&path)?;
        debug!(path = %path.display(), signed_in = session.is_signed_in(), "session file loaded");
        Ok(Self { path, cached: Mutex::new(session) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replace(&self, next: Session) -> Result<(), SessionError> {
        // Held across the disk write so concurrent writers persist in lock order.
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        persist(&self.path, &next)?;
        *cached = next;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Session {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, token: &str, username: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.replace(Session::signed_in(token, username))
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.replace(Session::anonymous())
    }
}

fn load(path: &Path) -> Result<Session, SessionError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::anonymous()),
        Err(source) => return Err(SessionError::Io { path: path.to_owned(), source }),
    };
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Ok(session),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable session file; treating as signed out");
            Ok(Session::anonymous())
        }
    }
}

fn persist(path: &Path, session: &Session) -> Result<(), SessionError> {
    let io_err = |source: std::io::Error| SessionError::Io { path: path.to_owned(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let body = serde_json::to_vec_pretty(session)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, body).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
