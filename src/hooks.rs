//! Post-commit hooks
//!
//! Listeners run after a bundle key was committed and the migrator finished.
//! Hosts use them for cache flushes, rewrite reinitialisation and the like.

use crate::sync::RwLockExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Listener receiving (`bundle_key`, `old_value`, `new_value`)
pub type CommitCallback = Arc<dyn Fn(&str, &Value, &Value) + Send + Sync>;

/// Registered commit listeners
#[derive(Default)]
pub struct CommitHooks {
    global: RwLock<Vec<CommitCallback>>,
    by_key: RwLock<HashMap<String, Vec<CommitCallback>>>,
}

impl CommitHooks {
    /// No listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to commits of every key
    pub fn on_commit<F>(&self, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.global.write_recovered().push(Arc::new(callback));
    }

    /// Listen to commits of one bundle key
    pub fn watch<F>(&self, bundle_key: &str, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.by_key
            .write_recovered()
            .entry(bundle_key.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Drop every listener of one bundle key
    pub fn unwatch(&self, bundle_key: &str) {
        self.by_key.write_recovered().remove(bundle_key);
    }

    /// Drop all listeners
    pub fn clear(&self) {
        self.global.write_recovered().clear();
        self.by_key.write_recovered().clear();
    }

    /// Number of listeners that would fire for `bundle_key`
    #[must_use]
    pub fn listener_count(&self, bundle_key: &str) -> usize {
        self.global.read_recovered().len()
            + self.by_key.read_recovered().get(bundle_key).map_or(0, Vec::len)
    }

    /// Call global listeners, then the key's listeners.
    ///
    /// Listeners are collected before any of them runs, so a listener may
    /// register hooks or save again without deadlocking.
    pub fn notify(&self, bundle_key: &str, old_value: &Value, new_value: &Value) {
        let mut callbacks: Vec<CommitCallback> = self.global.read_recovered().clone();
        if let Some(listeners) = self.by_key.read_recovered().get(bundle_key) {
            callbacks.extend(listeners.iter().cloned());
        }

        for callback in callbacks {
            callback(bundle_key, old_value, new_value);
        }
    }
}

impl std::fmt::Debug for CommitHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitHooks")
            .field("global", &self.global.read_recovered().len())
            .field("by_key", &self.by_key.read_recovered().len())
            .finish()
    }
}
