//! Persistence
//!
//! Two tiers:
//!
//! - [`KeyValueStore`]: small local key/value storage (avatar config, the
//!   signed-out course list, chat messages). [`FileStore`] keeps one JSON file
//!   per key under the data directory; [`MemoryStore`] is for tests and
//!   ephemeral hosts.
//! - [`hosted::HostedStore`]: per-user remote tables used when a session is
//!   present.
//!
//! [`library::CourseLibrary`] picks between them.

pub mod hosted;
pub mod library;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use hosted::{HostedStore, Session, SupabaseStore};
pub use library::CourseLibrary;

/// Errors from local or hosted storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// Local file could not be read or written
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored value is not in the expected shape and was left untouched
    #[error("stored value for key '{key}' is corrupt: {reason}")]
    Corrupt {
        /// Key being accessed
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Value could not be serialized
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Hosted store rejected the request
    #[error("hosted store returned {status}: {body}")]
    Hosted {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Hosted store could not be reached
    #[error("hosted store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Synchronous string key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the backing medium fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the backing medium fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read a JSON value, treating corrupt or missing data as absent
///
/// Corrupt data is logged at warn level and skipped.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring corrupt stored value");
            None
        }
    }
}

/// Serialize a value as JSON and store it
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Default local data directory (`$XDG_DATA_HOME/ai-professor`)
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ai-professor")
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at [`default_data_dir`]
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(default_data_dir())
    }

    /// Directory holding the files
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| Self::io_error(key, e))?;

        // Readers never observe a partially written file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))?;

        tracing::debug!(key, path = %path.display(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("avatarConfig").unwrap(), None);
        store.set("avatarConfig", "{\"size\":1}").unwrap();
        assert_eq!(
            store.get("avatarConfig").unwrap().as_deref(),
            Some("{\"size\":1}")
        );

        store.remove("avatarConfig").unwrap();
        assert_eq!(store.get("avatarConfig").unwrap(), None);
        // Removing twice is fine
        store.remove("avatarConfig").unwrap();
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_read_json_skips_corrupt_data() {
        let store = MemoryStore::new();
        store.set("courses", "{not json").unwrap();
        let value: Option<Vec<String>> = read_json(&store, "courses");
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStore::new();
        write_json(&store, "list", &vec![1, 2, 3]).unwrap();
        let value: Option<Vec<i32>> = read_json(&store, "list");
        assert_eq!(value, Some(vec![1, 2, 3]));
    }
}
