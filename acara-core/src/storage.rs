//! Persistent key-value storage.
//!
//! The cache, event store, and auth service all persist small JSON blobs
//! under string keys. Reads are tolerant: a missing or corrupt value is
//! treated as absent. File writes go through a temp file + rename so a
//! crash mid-write cannot leave a half-written blob behind.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AcaraError, AcaraResult};

/// Storage keys used across the services.
pub mod keys {
    pub const EVENTS: &str = "events";
    pub const LAST_SYNC: &str = "last_sync";
    pub const AUTH_SESSION: &str = "auth_session";
    pub const AUTH_EXPIRY: &str = "auth_expiry";
}

/// String-keyed JSON blob storage.
pub trait Storage: Send + Sync {
    /// Read the raw JSON text stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Write raw JSON text under `key`.
    fn write(&self, key: &str, value: &str) -> AcaraResult<()>;

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// Deserialize the value under `key`; `None` on absent or corrupt data.
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.read(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "corrupt value in storage, treating as absent");
            None
        }
    }
}

/// Serialize `value` under `key`, recovering (with a log record) on failure.
pub fn write_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, %err, "could not serialize value for storage");
            return;
        }
    };
    if let Err(err) = storage.write(key, &raw) {
        warn!(key, %err, "could not persist value");
    }
}

/// One `<key>.json` file per key under a root directory.
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted at the platform data dir (`<data dir>/acara`).
    pub fn default_location() -> AcaraResult<Self> {
        let root = dirs::data_dir()
            .ok_or_else(|| AcaraError::Storage("Could not determine data directory".into()))?
            .join("acara");
        Ok(Self::new(root))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> AcaraResult<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| AcaraError::Storage(format!("Could not create {}: {e}", self.root.display())))?;

        let path = self.path_for(key);
        let temp = self.root.join(format!("{key}.json.tmp"));

        std::fs::write(&temp, value)
            .map_err(|e| AcaraError::Storage(format!("Could not write {}: {e}", temp.display())))?;

        // Atomic on POSIX when temp and target share a filesystem
        std::fs::rename(&temp, &path)
            .map_err(|e| AcaraError::Storage(format!("Could not rename to {}: {e}", path.display())))?;

        Ok(())
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) -> AcaraResult<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
