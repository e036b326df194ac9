//! Persistence stores
//!
//! The engine reads previous values from a [`SettingsStore`] and the manager
//! commits validated values back to it. Two stores ship with the crate:
//!
//! - [`MemoryStore`]: process-local, for hosts that persist elsewhere and tests
//! - [`JsonFileStore`]: one JSON file holding every bundle key

use crate::error::Result;
use crate::storage::{JsonStorage, StorageBackend};
use crate::sync::RwLockExt;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Read/commit boundary between the engine and the host's storage
pub trait SettingsStore: Send + Sync {
    /// Currently stored value for a bundle key
    fn get_stored(&self, bundle_key: &str) -> Option<Value>;

    /// Persist a new value for a bundle key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted. The previously
    /// stored value must then still be in place.
    fn commit(&self, bundle_key: &str, value: &Value) -> Result<()>;
}

// =============================================================================
// Memory
// =============================================================================

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a bundle
    #[must_use]
    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Copy of everything stored
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.values.read_recovered().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn get_stored(&self, bundle_key: &str) -> Option<Value> {
        self.values.read_recovered().get(bundle_key).cloned()
    }

    fn commit(&self, bundle_key: &str, value: &Value) -> Result<()> {
        self.values
            .write_recovered()
            .insert(bundle_key.to_string(), value.clone());
        Ok(())
    }
}

// =============================================================================
// JSON File
// =============================================================================

/// Store backed by a single bundle file
///
/// The file is loaded once when the store is opened. Every commit rewrites the
/// whole file atomically; the in-memory copy only changes after the write
/// succeeded.
#[derive(Debug)]
pub struct JsonFileStore<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    backend: S,
    values: RwLock<Map<String, Value>>,
}

impl JsonFileStore<JsonStorage> {
    /// Open (or lazily create) a pretty-printed JSON bundle file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_backend(path, JsonStorage::new())
    }
}

impl<S: StorageBackend> JsonFileStore<S> {
    /// Open a bundle file with an explicit backend
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn with_backend(path: impl Into<PathBuf>, backend: S) -> Result<Self> {
        let path = path.into();
        let values = load(&backend, &path)?;
        log::debug!("Opened bundle file {} ({} keys)", path.display(), values.len());

        Ok(Self {
            path,
            backend,
            values: RwLock::new(values),
        })
    }

    /// Path of the bundle file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Discard the in-memory copy and read the file again
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn reload(&self) -> Result<()> {
        let values = load(&self.backend, &self.path)?;
        *self.values.write_recovered() = values;
        Ok(())
    }
}

impl<S: StorageBackend> SettingsStore for JsonFileStore<S> {
    fn get_stored(&self, bundle_key: &str) -> Option<Value> {
        self.values.read_recovered().get(bundle_key).cloned()
    }

    fn commit(&self, bundle_key: &str, value: &Value) -> Result<()> {
        let mut values = self.values.write_recovered();

        let mut next = values.clone();
        next.insert(bundle_key.to_string(), value.clone());
        self.backend.write(&self.path, &next)?;

        *values = next;
        log::debug!("Committed '{}' to {}", bundle_key, self.path.display());
        Ok(())
    }
}

fn load<S: StorageBackend>(backend: &S, path: &Path) -> Result<Map<String, Value>> {
    if path.exists() {
        backend.read(path)
    } else {
        Ok(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get_stored("site"), None);

        store.commit("site", &json!({"a": 1})).unwrap();
        assert_eq!(store.get_stored("site"), Some(json!({"a": 1})));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_stored("site"), None);
        store.commit("site", &json!({"title_location": "right"})).unwrap();
        store.commit("flag", &json!(1)).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_stored("site"), Some(json!({"title_location": "right"})));
        assert_eq!(reopened.get_stored("flag"), Some(json!(1)));
    }

    #[test]
    fn test_file_store_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");

        let store = JsonFileStore::open(&path).unwrap();
        std::fs::write(&path, r#"{"flag": 0}"#).unwrap();
        assert_eq!(store.get_stored("flag"), None);

        store.reload().unwrap();
        assert_eq!(store.get_stored("flag"), Some(json!(0)));
    }

    #[test]
    fn test_failed_commit_keeps_previous_value() {
        let dir = tempdir().unwrap();
        // The bundle "file" is a directory, so the rename fails
        let path = dir.path().join("options.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let store = JsonFileStore::with_backend(dir.path().join("ok.json"), JsonStorage::compact()).unwrap();
        store.commit("flag", &json!(1)).unwrap();

        let broken = JsonFileStore {
            path,
            backend: JsonStorage::compact(),
            values: RwLock::new(store.values.read_recovered().clone()),
        };
        let err = broken.commit("flag", &json!(0)).unwrap_err();
        assert!(err.is_store_error());
        assert_eq!(broken.get_stored("flag"), Some(json!(1)));
    }
}
