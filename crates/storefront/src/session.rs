//! Login session context and its persistence.
//!
//! A [`SessionContext`] is the explicit bundle of credentials (token,
//! username, wallet balance) handed to whatever needs them. A
//! [`SessionStore`] persists it across runs with explicit `load`, `save`
//! and `clear` calls, tied to login and logout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors reading or writing a persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] io::Error),

    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Credentials of the current user, or none when logged out.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Option<SecretString>,
    username: Option<String>,
    balance: Option<Decimal>,
}

impl SessionContext {
    /// A session with no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for a logged-in user.
    #[must_use]
    pub fn logged_in(token: SecretString, username: impl Into<String>, balance: Decimal) -> Self {
        Self {
            token: Some(token),
            username: Some(username.into()),
            balance: Some(balance),
        }
    }

    /// True when a non-empty token is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.token_str().is_empty()
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The bearer token, or `""` when logged out.
    #[must_use]
    pub fn token_str(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.expose_secret())
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Wallet balance reported at login.
    #[must_use]
    pub const fn balance(&self) -> Option<Decimal> {
        self.balance
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

/// On-disk shape of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    balance: Option<Decimal>,
}

impl From<&SessionContext> for StoredSession {
    fn from(session: &SessionContext) -> Self {
        Self {
            token: session.token.as_ref().map(|t| t.expose_secret().to_owned()),
            username: session.username.clone(),
            balance: session.balance,
        }
    }
}

impl From<StoredSession> for SessionContext {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: stored
                .token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            username: stored.username,
            balance: stored.balance,
        }
    }
}

/// Persistence for the session context.
pub trait SessionStore: Send + Sync {
    /// Read the persisted session; anonymous when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but can't be read.
    fn load(&self) -> Result<SessionContext, SessionError>;

    /// Persist `session`, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session can't be written.
    fn save(&self, session: &SessionContext) -> Result<(), SessionError>;

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but can't be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

// =============================================================================
// FileSessionStore
// =============================================================================

/// Session stored as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionContext, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session file, starting anonymous");
                return Ok(SessionContext::anonymous());
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&contents)?;
        Ok(stored.into())
    }

    fn save(&self, session: &SessionContext) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&StoredSession::from(session))?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemorySessionStore
// =============================================================================

/// Session kept in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    stored: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        // A poisoned lock still holds a usable session value
        self.stored
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionContext, SessionError> {
        Ok(self.slot().clone().map(Into::into).unwrap_or_default())
    }

    fn save(&self, session: &SessionContext) -> Result<(), SessionError> {
        *self.slot() = Some(StoredSession::from(session));
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}
