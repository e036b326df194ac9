//! Backward-compatibility migration
//!
//! After every successful commit the manager keeps deprecated sub-keys in
//! step with their current replacements, so code still reading old names
//! sees current values. The migration is a pure single pass over the stored
//! compound value: running it twice changes nothing the second time.

use crate::error::Result;
use crate::rules::coerce::is_truthy;
use crate::store::SettingsStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};

/// One compatibility step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompatStep {
    /// Copy `from` into `to`. When `from` is absent `to` keeps its value.
    Mirror { from: String, to: String },
    /// `target = source[item]` when that flag is set, `0` otherwise
    FlagFromSet {
        source: String,
        item: String,
        target: String,
    },
}

impl CompatStep {
    fn apply(&self, bundle: &mut Map<String, Value>) {
        match self {
            CompatStep::Mirror { from, to } => {
                if let Some(value) = bundle.get(from).cloned() {
                    bundle.insert(to.clone(), value);
                }
            }
            CompatStep::FlagFromSet { source, item, target } => {
                let flag = bundle
                    .get(source)
                    .and_then(|set| set.get(item))
                    .filter(|flag| is_truthy(flag))
                    .cloned()
                    .unwrap_or_else(|| Value::from(0));
                bundle.insert(target.clone(), flag);
            }
        }
    }
}

/// Compatibility steps for one compound bundle key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migrator {
    bundle_key: String,
    #[serde(default)]
    steps: Vec<CompatStep>,
}

impl Migrator {
    /// Migrator without steps
    #[must_use]
    pub fn new(bundle_key: impl Into<String>) -> Self {
        Self {
            bundle_key: bundle_key.into(),
            steps: Vec::new(),
        }
    }

    /// Add a step
    #[must_use]
    pub fn step(mut self, step: CompatStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a [`CompatStep::Mirror`]
    #[must_use]
    pub fn mirror(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.step(CompatStep::Mirror {
            from: from.into(),
            to: to.into(),
        })
    }

    /// Add a [`CompatStep::FlagFromSet`]
    #[must_use]
    pub fn flag_from_set(
        self,
        source: impl Into<String>,
        item: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.step(CompatStep::FlagFromSet {
            source: source.into(),
            item: item.into(),
            target: target.into(),
        })
    }

    /// Bundle key this migrator maintains
    #[must_use]
    pub fn bundle_key(&self) -> &str {
        &self.bundle_key
    }

    /// Steps in application order
    #[must_use]
    pub fn steps(&self) -> &[CompatStep] {
        &self.steps
    }

    /// Apply every step to a copy of `bundle`
    #[must_use]
    pub fn apply(&self, bundle: &Map<String, Value>) -> Map<String, Value> {
        let mut migrated = bundle.clone();
        for step in &self.steps {
            step.apply(&mut migrated);
        }
        migrated
    }

    /// Migrate the stored value and commit it when anything changed.
    ///
    /// Returns whether a commit happened. A missing or non-map stored value
    /// is left alone.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the commit fails.
    pub fn run(&self, store: &dyn SettingsStore) -> Result<bool> {
        let Some(Value::Object(current)) = store.get_stored(&self.bundle_key) else {
            return Ok(false);
        };

        let migrated = self.apply(&current);
        if migrated == current {
            return Ok(false);
        }

        store.commit(&self.bundle_key, &Value::Object(migrated))?;
        log::debug!("Compatibility keys for '{}' updated", self.bundle_key);
        Ok(true)
    }
}

// =============================================================================
// Re-entry guard
// =============================================================================

/// Marks a migration as running; clears the flag when dropped
pub(crate) struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    /// Claim the flag, or `None` if a migration is already running
    pub(crate) fn enter(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
