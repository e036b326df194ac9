//! Builder for OptionsManager
//!
//! [`OptionsManagerBuilder`] collects the configuration, the registration
//! passes, defaults and the migrator, and picks the store when built.

use crate::catalog;
use crate::config::SanitizerConfigBuilder;
use crate::defaults::{DefaultsProvider, StaticDefaults};
use crate::error::Result;
use crate::hooks::CommitHooks;
use crate::migrate::Migrator;
use crate::registry::Registry;
use crate::store::{JsonFileStore, MemoryStore, SettingsStore};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, OnceLock};

use super::OptionsManager;

/// One registration pass over the registry
pub type CatalogPass = Arc<dyn Fn(&mut Registry) -> Result<()> + Send + Sync>;

/// Fluent builder for [`OptionsManager`]
///
/// # Example
///
/// ```rust,no_run
/// use rcsan::OptionsManager;
///
/// let manager = OptionsManager::builder("my-site")
///     .config_dir("~/.config/my-site")
///     .with_site_catalog()
///     .db_version("db_version", "3103")
///     .build()
///     .unwrap();
/// ```
pub struct OptionsManagerBuilder {
    config_builder: SanitizerConfigBuilder,
    catalog: Vec<CatalogPass>,
    site_catalog: bool,
    defaults: Option<Box<dyn DefaultsProvider>>,
    migrator: Option<Migrator>,
}

impl OptionsManagerBuilder {
    /// Create a builder with the required app name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config_builder: SanitizerConfigBuilder::new(app_name),
            catalog: Vec::new(),
            site_catalog: false,
            defaults: None,
            migrator: None,
        }
    }

    /// Set the configuration directory (supports `~`)
    #[must_use]
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.config_dir(path);
        self
    }

    /// Set the bundle filename (default: "options.json")
    #[must_use]
    pub fn settings_file(mut self, filename: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.settings_file(filename);
        self
    }

    /// Set the name of the live settings bundle
    #[must_use]
    pub fn settings_field(mut self, field: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.settings_field(field);
        self
    }

    /// Write the bundle file as single-line JSON
    #[must_use]
    pub fn compact_json(mut self) -> Self {
        self.config_builder = self.config_builder.compact_json();
        self
    }

    /// Record `version` under `key` whenever the live bundle is saved
    #[must_use]
    pub fn db_version(mut self, key: impl Into<String>, version: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.db_version(key, version);
        self
    }

    /// Add a registration pass
    ///
    /// Passes run in the order they were added, once, when the registry is
    /// first needed.
    #[must_use]
    pub fn with_catalog<F>(mut self, pass: F) -> Self
    where
        F: Fn(&mut Registry) -> Result<()> + Send + Sync + 'static,
    {
        self.catalog.push(Arc::new(pass));
        self
    }

    /// Use the site settings catalog for the live bundle
    ///
    /// Registers every site key and, unless set explicitly, installs the site
    /// defaults and compatibility migrator.
    #[must_use]
    pub fn with_site_catalog(mut self) -> Self {
        self.site_catalog = true;
        self
    }

    /// Set the defaults provider
    #[must_use]
    pub fn with_defaults(mut self, defaults: impl DefaultsProvider + 'static) -> Self {
        self.defaults = Some(Box::new(defaults));
        self
    }

    /// Set the post-commit compatibility migrator
    #[must_use]
    pub fn with_migrator(mut self, migrator: Migrator) -> Self {
        self.migrator = Some(migrator);
        self
    }

    /// Build a manager over the JSON bundle file in the config directory
    ///
    /// # Errors
    ///
    /// Returns an error if an existing bundle file cannot be read or parsed.
    pub fn build(self) -> Result<OptionsManager<JsonFileStore>> {
        let config = self.config_builder.clone().build();
        let store = JsonFileStore::with_backend(config.settings_path(), config.storage)?;
        Ok(self.build_with_store(store))
    }

    /// Build a manager over a fresh in-memory store
    #[must_use]
    pub fn build_in_memory(self) -> OptionsManager<MemoryStore> {
        self.build_with_store(MemoryStore::new())
    }

    /// Build a manager over a host-provided store
    #[must_use]
    pub fn build_with_store<St: SettingsStore>(self, store: St) -> OptionsManager<St> {
        let config = self.config_builder.build();
        let field = config.settings_field;

        let mut passes = self.catalog;
        let mut defaults = self.defaults;
        let mut migrator = self.migrator;

        if self.site_catalog {
            let bundle_key = field.clone();
            passes.insert(
                0,
                Arc::new(move |registry: &mut Registry| catalog::register_site(registry, &bundle_key)),
            );
            defaults.get_or_insert_with(|| {
                Box::new(catalog::site_defaults(&field)) as Box<dyn DefaultsProvider>
            });
            migrator.get_or_insert_with(|| catalog::site_migrator(&field));
        }

        OptionsManager {
            settings_field: field,
            db_version: config.db_version,
            store,
            defaults: defaults.unwrap_or_else(|| Box::new(StaticDefaults::new())),
            catalog: passes,
            registry: OnceLock::new(),
            registry_build: Mutex::new(()),
            migrator,
            migrating: AtomicBool::new(false),
            hooks: CommitHooks::new(),
        }
    }
}
