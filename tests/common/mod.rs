//! Common test utilities for rcsan integration tests
//!
//! Provides a site-settings fixture, a store that can be told to fail, and
//! small JSON helpers.

#![allow(dead_code)]

use rcsan::catalog::SITE_SETTINGS;
use rcsan::{Error, FileManager, MemoryStore, OptionsManager, Result, SettingsStore};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

/// Site-catalog manager over a JSON file in a temp directory
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub manager: FileManager,
}

impl TestFixture {
    /// Fresh directory, site catalog, db version marker
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = Self::open(&temp_dir);
        Self { temp_dir, manager }
    }

    /// Second manager over the same bundle file
    pub fn reopen(&self) -> FileManager {
        Self::open(&self.temp_dir)
    }

    /// Path of the bundle file
    pub fn settings_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("options.json")
    }

    /// Save into the site bundle
    pub fn save_site(&self, candidate: Value) -> Value {
        self.manager
            .save(SITE_SETTINGS, &candidate)
            .expect("Failed to save site settings")
    }

    fn open(dir: &TempDir) -> FileManager {
        OptionsManager::builder("test-app")
            .config_dir(dir.path())
            .with_site_catalog()
            .db_version("db_version", "3103")
            .build()
            .expect("Failed to create manager")
    }
}

// =============================================================================
// Failing Store
// =============================================================================

/// Memory store whose commits start failing after `ok_commits` successes
pub struct FlakyStore {
    inner: MemoryStore,
    ok_commits: usize,
    commits: AtomicUsize,
}

impl FlakyStore {
    pub fn new(ok_commits: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            ok_commits,
            commits: AtomicUsize::new(0),
        }
    }

    /// Commits attempted so far, failed ones included
    pub fn attempts(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl SettingsStore for FlakyStore {
    fn get_stored(&self, bundle_key: &str) -> Option<Value> {
        self.inner.get_stored(bundle_key)
    }

    fn commit(&self, bundle_key: &str, value: &Value) -> Result<()> {
        let attempt = self.commits.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.ok_commits {
            return Err(Error::CommitFailed {
                key: bundle_key.to_string(),
                reason: "store unavailable".into(),
            });
        }
        self.inner.commit(bundle_key, value)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Unwrap a JSON object
pub fn as_map(value: &Value) -> &Map<String, Value> {
    value.as_object().expect("expected a JSON object")
}

/// Initialise logging once; later calls are ignored
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
