//! Storage backend for file-backed stores
//!
//! A [`StorageBackend`] owns the on-disk format of the bundle file. Writes are
//! atomic: content goes to a sibling `.tmp` file that is renamed over the
//! target, so a crash never leaves a half-written bundle behind.

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// On-disk format of a bundle file
pub trait StorageBackend: Clone + Send + Sync {
    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize a file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.deserialize(&content)
    }

    /// Serialize and write a file atomically
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!("Invalid path '{}': must have a filename", path.display()))
        })?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        std::fs::write(&temp_path, &content).map_err(|source| Error::FileWrite {
            path: temp_path.clone(),
            source,
        })?;

        std::fs::rename(&temp_path, path).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

// =============================================================================
// JSON
// =============================================================================

/// JSON backend (pretty-printed by default)
#[derive(Debug, Clone, Default)]
pub struct JsonStorage {
    pretty: bool,
}

impl JsonStorage {
    /// Pretty-printed JSON
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line JSON
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl StorageBackend for JsonStorage {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}
