//! Key/value persistence for theme preferences
//!
//! Persistence is best-effort throughout this crate: every adapter
//! swallows its own failures (quota, missing directory, malformed file,
//! read-only host) and degrades to `None` / no-op. Nothing above the
//! adapter ever sees a storage error.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Minimal persistence capability.
///
/// Implementations must never panic and never surface failures to the
/// caller; a backend that cannot serve a request behaves as if the key
/// does not exist.
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: &str);

    /// Remove the value stored under `key` (no-op if absent)
    fn remove(&self, key: &str);
}

/// In-memory adapter for tests and hosts without durable storage
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Storage backend failures, internal to [`FileStorage`]
#[derive(Error, Debug)]
enum StorageError {
    /// Filesystem read/write failed
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    /// Stored table is not valid TOML
    #[error("storage parse: {0}")]
    Parse(#[from] toml::de::Error),

    /// Table could not be serialized
    #[error("storage serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Durable adapter backed by a TOML key/value table on disk.
///
/// The whole table is re-read on every access and rewritten on every
/// mutation; preference writes are rare enough that simplicity wins over
/// caching. A missing file reads as an empty table.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create an adapter persisting to `path` (e.g. a file under the
    /// application's config directory)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string(table)?)?;
        Ok(())
    }
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_table() {
            Ok(table) => table.get(key).cloned(),
            Err(err) => {
                tracing::debug!(path = %self.path.display(), "storage read failed: {err}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let mut table = match self.read_table() {
            Ok(table) => table,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), "storage read failed: {err}");
                BTreeMap::new()
            }
        };
        table.insert(key.to_string(), value.to_string());
        if let Err(err) = self.write_table(&table) {
            tracing::debug!(path = %self.path.display(), "storage write failed: {err}");
        }
    }

    fn remove(&self, key: &str) {
        let mut table = match self.read_table() {
            Ok(table) => table,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), "storage read failed: {err}");
                return;
            }
        };
        if table.remove(key).is_some() {
            if let Err(err) = self.write_table(&table) {
                tracing::debug!(path = %self.path.display(), "storage write failed: {err}");
            }
        }
    }
}
