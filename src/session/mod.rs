// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Session token persistence.
//!
//! The auth token is the only state that outlives the process. It is kept
//! behind [`TokenStore`] so the CLI persists to disk while tests and embedded
//! callers can stay in memory.

mod file;

use std::io;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use file::{FileTokenStore, SessionPaths};

/// Error type for token persistence.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Session store unavailable")]
    Unavailable,
}

/// A persisted session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Durable storage for the session token.
pub trait TokenStore: Send + Sync {
    /// The stored session, if any.
    fn load(&self) -> Result<Option<StoredSession>, SessionError>;

    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;

    /// Remove the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            session: Mutex::new(Some(StoredSession::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        self.session
            .lock()
            .map(|s| s.clone())
            .map_err(|_| SessionError::Unavailable)
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        let mut guard = self.session.lock().map_err(|_| SessionError::Unavailable)?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.session.lock().map_err(|_| SessionError::Unavailable)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&StoredSession::new("tok")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "tok");

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn seeded_store_has_token() {
        let store = MemoryTokenStore::with_token("seed");
        assert_eq!(store.load().unwrap().unwrap().token, "seed");
    }
}
