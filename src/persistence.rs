//! Key-value persistence for conversation history and widget visibility.
//!
//! SYSTEM CONTEXT
//! ==============
//! The widget treats storage as a flat string key-value store, the same
//! contract browser `localStorage` offers. [`KeyValueStore`] is that seam;
//! [`ConversationStore`] layers the two well-known keys and their JSON
//! encoding on top so the conversation manager never touches raw strings.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. An unparsable history is treated as a first run
//! (empty history). Write failures are logged and reported to the caller,
//! which logs and carries on with its in-memory state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "conversationHistory";
pub const VISIBILITY_KEY: &str = "chatState";

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// TURNS AND VISIBILITY
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One immutable message in the conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Open/closed state of the widget window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Open,
    Closed,
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

// =============================================================================
// KEY-VALUE STORE
// =============================================================================

/// Flat string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map, so a test can hand one clone
/// to a manager and keep another to inspect or to "reload" from.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map().remove(key);
        Ok(())
    }
}

/// Directory-backed store: one file per key.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io { key: dir.display().to_string(), source })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_owned(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Readers never observe a partially written value.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io { key: key.to_owned(), source })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { key: key.to_owned(), source })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key: key.to_owned(), source }),
        }
    }
}

// =============================================================================
// CONVERSATION STORE
// =============================================================================

/// Typed access to the widget's two persisted keys.
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load persisted history. Missing, unreadable or corrupt data all yield
    /// an empty history.
    #[must_use]
    pub fn load_history(&self) -> Vec<ConversationTurn> {
        let raw = match self.backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "persistence: history unreadable, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ConversationTurn>>(&raw) {
            Ok(turns) => {
                debug!(turns = turns.len(), "persistence: history loaded");
                turns
            }
            Err(e) => {
                warn!(error = %e, raw_len = raw.len(), "persistence: history corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full history.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if encoding or the backend write fails.
    pub fn save_history(&self, history: &[ConversationTurn]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(history)
            .map_err(|source| StoreError::Serialize { key: HISTORY_KEY.to_owned(), source })?;
        self.backend.set(HISTORY_KEY, &raw)
    }

    /// Drop the persisted history entirely.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend removal fails.
    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.backend.remove(HISTORY_KEY)
    }

    /// Load persisted visibility. `None` when nothing (recognizable) is stored.
    #[must_use]
    pub fn load_visibility(&self) -> Option<Visibility> {
        match self.backend.get(VISIBILITY_KEY) {
            Ok(Some(raw)) => match raw.trim() {
                "open" => Some(Visibility::Open),
                "closed" => Some(Visibility::Closed),
                other => {
                    debug!(value = other, "persistence: unknown chat state ignored");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "persistence: chat state unreadable");
                None
            }
        }
    }

    /// Persist visibility.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend write fails.
    pub fn save_visibility(&self, visibility: Visibility) -> Result<(), StoreError> {
        self.backend.set(VISIBILITY_KEY, visibility.as_str())
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
