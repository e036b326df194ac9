//! Static defaults
//!
//! Rules that fall back past `previous` ask a [`DefaultsProvider`] for the
//! key's default.

use serde_json::{Map, Value};

/// Source of static default values
pub trait DefaultsProvider: Send + Sync {
    /// Default for a bundle key, or for one of its sub-keys
    fn default_for(&self, bundle_key: &str, sub_key: Option<&str>) -> Option<Value>;
}

/// Bundle-shaped defaults table
///
/// Holds one value per bundle key. For compound keys that value is a map and
/// sub-key defaults are read out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticDefaults {
    bundles: Map<String, Value>,
}

impl StaticDefaults {
    /// Empty table; every lookup misses
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default for a whole bundle key
    #[must_use]
    pub fn with(mut self, bundle_key: impl Into<String>, value: Value) -> Self {
        self.bundles.insert(bundle_key.into(), value);
        self
    }

    /// Set the default for one sub-key of a compound bundle key
    #[must_use]
    pub fn with_sub(mut self, bundle_key: impl Into<String>, sub_key: impl Into<String>, value: Value) -> Self {
        let entry = self
            .bundles
            .entry(bundle_key.into())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(sub_key.into(), value);
        }
        self
    }

    /// The full default value of a bundle key
    #[must_use]
    pub fn bundle(&self, bundle_key: &str) -> Option<&Value> {
        self.bundles.get(bundle_key)
    }
}

impl From<Map<String, Value>> for StaticDefaults {
    fn from(bundles: Map<String, Value>) -> Self {
        Self { bundles }
    }
}

impl DefaultsProvider for StaticDefaults {
    fn default_for(&self, bundle_key: &str, sub_key: Option<&str>) -> Option<Value> {
        let value = self.bundles.get(bundle_key)?;
        match sub_key {
            None => Some(value.clone()),
            Some(sub) => value.get(sub).cloned(),
        }
    }
}
