//! Options manager
//!
//! [`OptionsManager`] is the host-facing entry point: it owns the store, the
//! defaults and the lazily built registry, and runs the whole write
//! transaction for a bundle key.

mod builder;

pub use builder::{CatalogPass, OptionsManagerBuilder};

use crate::config::DbVersion;
use crate::defaults::DefaultsProvider;
use crate::error::Result;
use crate::hooks::CommitHooks;
use crate::migrate::{InProgress, Migrator};
use crate::registry::Registry;
use crate::sanitizer::Sanitizer;
use crate::store::{JsonFileStore, SettingsStore};
use crate::sync::MutexExt;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, OnceLock};

/// Sanitizes and saves option bundles
///
/// A save runs, in order:
///
/// 1. Read the previous value and validate the candidate against it
/// 2. Commit the validated value
/// 3. Record the db version marker (live bundle only)
/// 4. Run the compatibility migrator (its bundle only, never re-entered)
/// 5. Notify commit hooks
///
/// Steps 3 to 5 are best effort; their failures are logged and do not undo
/// the commit.
///
/// The registry build is serialized, so a manager shared across threads runs
/// its catalog passes once. Saves are not: the manager assumes a single
/// writer per bundle key. A migration that is already running when another
/// save commits is not repeated for that save.
///
/// # Example
///
/// ```rust
/// use rcsan::{OptionsManager, Rule, StaticDefaults};
/// use serde_json::json;
///
/// let manager = OptionsManager::builder("my-site")
///     .with_catalog(|registry| {
///         registry.define_rule("left_right", Rule::one_of(["left", "right"]))?;
///         registry.register("left_right", "title_location", ());
///         Ok(())
///     })
///     .with_defaults(StaticDefaults::new().with("title_location", json!("left")))
///     .build_in_memory();
///
/// assert_eq!(manager.save("title_location", &json!("center")).unwrap(), json!("left"));
/// assert_eq!(manager.save("title_location", &json!("right")).unwrap(), json!("right"));
/// ```
pub struct OptionsManager<St: SettingsStore = JsonFileStore> {
    /// Name of the live settings bundle
    settings_field: String,

    /// Version marker written on save of the live bundle
    db_version: Option<DbVersion>,

    store: St,

    defaults: Box<dyn DefaultsProvider>,

    /// Registration passes, run once when the registry is first needed
    catalog: Vec<CatalogPass>,

    registry: OnceLock<Registry>,

    /// Held while the catalog passes run
    registry_build: Mutex<()>,

    migrator: Option<Migrator>,

    /// Set while the migrator runs, so a save it triggers skips migration
    migrating: AtomicBool,

    hooks: CommitHooks,
}

impl OptionsManager {
    /// Start building a manager
    pub fn builder(app_name: impl Into<String>) -> OptionsManagerBuilder {
        OptionsManagerBuilder::new(app_name)
    }
}

impl<St: SettingsStore> OptionsManager<St> {
    /// Name of the live settings bundle
    #[must_use]
    pub fn settings_field(&self) -> &str {
        &self.settings_field
    }

    /// The underlying store
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Commit hooks
    pub fn hooks(&self) -> &CommitHooks {
        &self.hooks
    }

    /// The registry, built on first use
    ///
    /// # Errors
    ///
    /// Returns the first error of a registration pass (typically an invalid
    /// rule definition). The build is retried on the next call.
    pub fn registry(&self) -> Result<&Registry> {
        if let Some(registry) = self.registry.get() {
            return Ok(registry);
        }

        let _building = self.registry_build.lock_recovered();
        if let Some(registry) = self.registry.get() {
            return Ok(registry);
        }

        let mut registry = Registry::new();
        registry.initialize_with(|r| self.catalog.iter().try_for_each(|pass| pass(&mut *r)))?;
        Ok(self.registry.get_or_init(|| registry))
    }

    /// Dispatcher bound to this manager's registry, store and defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be built.
    pub fn sanitizer(&self) -> Result<Sanitizer<'_>> {
        Ok(Sanitizer::new(self.registry()?, &self.store, self.defaults.as_ref()))
    }

    /// Validate a candidate without committing it
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be built.
    pub fn sanitize(&self, bundle_key: &str, candidate: &Value) -> Result<Value> {
        Ok(self.sanitizer()?.sanitize(bundle_key, candidate))
    }

    /// Validate and commit a candidate, then run post-commit work
    ///
    /// Returns the value that was committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be built or the commit fails.
    /// Nothing was written in either case.
    pub fn save(&self, bundle_key: &str, candidate: &Value) -> Result<Value> {
        let sanitizer = self.sanitizer()?;
        let previous = self.store.get_stored(bundle_key);
        let accepted = sanitizer.sanitize_against(bundle_key, candidate, previous.as_ref());

        self.store.commit(bundle_key, &accepted)?;
        debug!("Saved '{bundle_key}'");

        self.after_commit(bundle_key, &previous.unwrap_or(Value::Null), &accepted);
        Ok(accepted)
    }

    /// Change one sub-key of the live bundle and save the whole bundle
    ///
    /// # Errors
    ///
    /// Same as [`save`](Self::save).
    pub fn update_option(&self, sub_key: &str, value: Value) -> Result<Value> {
        let mut bundle = match self.store.get_stored(&self.settings_field) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        bundle.insert(sub_key.to_string(), value);

        let saved = self.save(&self.settings_field, &Value::Object(bundle))?;
        Ok(saved.get(sub_key).cloned().unwrap_or(Value::Null))
    }

    /// Currently stored value of a bundle key
    #[must_use]
    pub fn stored(&self, bundle_key: &str) -> Option<Value> {
        self.store.get_stored(bundle_key)
    }

    /// Stored sub-value of the live bundle, or its default
    #[must_use]
    pub fn option(&self, sub_key: &str) -> Option<Value> {
        self.store
            .get_stored(&self.settings_field)
            .and_then(|bundle| bundle.get(sub_key).cloned())
            .or_else(|| self.defaults.default_for(&self.settings_field, Some(sub_key)))
    }

    /// Static default of a sub-key of the live bundle
    #[must_use]
    pub fn default_option(&self, sub_key: &str) -> Option<Value> {
        self.defaults.default_for(&self.settings_field, Some(sub_key))
    }

    fn after_commit(&self, bundle_key: &str, previous: &Value, accepted: &Value) {
        if bundle_key == self.settings_field {
            self.record_db_version();
        }

        if let Some(migrator) = self.migrator.as_ref().filter(|m| m.bundle_key() == bundle_key) {
            self.migrate(migrator);
        }

        self.hooks.notify(bundle_key, previous, accepted);
    }

    fn migrate(&self, migrator: &Migrator) {
        let Some(_guard) = InProgress::enter(&self.migrating) else {
            debug!("Skipping migration of '{}': already running", migrator.bundle_key());
            return;
        };

        if let Err(e) = migrator.run(&self.store) {
            warn!("Compatibility migration of '{}' failed: {e}", migrator.bundle_key());
        }
    }

    fn record_db_version(&self) {
        let Some(db) = &self.db_version else {
            return;
        };

        let version = Value::String(db.version.clone());
        if self.store.get_stored(&db.key).as_ref() == Some(&version) {
            return;
        }

        match self.store.commit(&db.key, &version) {
            Ok(()) => info!("Database version set to {}", db.version),
            Err(e) => warn!("Failed to record database version: {e}"),
        }
    }
}

impl<St: SettingsStore> std::fmt::Debug for OptionsManager<St> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsManager")
            .field("settings_field", &self.settings_field)
            .field("db_version", &self.db_version)
            .field("registry_built", &self.registry.get().is_some())
            .field("migrator", &self.migrator)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
