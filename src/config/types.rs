//! Configuration types for the options manager

use std::path::PathBuf;

use crate::storage::{JsonStorage, StorageBackend};

/// Default name of the live settings bundle
pub const DEFAULT_SETTINGS_FIELD: &str = "site_settings";

/// Version marker written after every successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbVersion {
    /// Store key holding the version
    pub key: String,
    /// Version written on save
    pub version: String,
}

/// Configuration for an [`OptionsManager`](crate::OptionsManager)
#[derive(Debug, Clone)]
pub struct SanitizerConfig<S: StorageBackend = JsonStorage> {
    /// Directory holding the bundle file
    pub config_dir: PathBuf,

    /// Bundle filename (e.g., "options.json")
    pub settings_file: String,

    /// Application name
    pub app_name: String,

    /// Name of the live settings bundle
    pub settings_field: String,

    /// Storage backend for the bundle file
    pub storage: S,

    /// Version marker updated on every save, if any
    pub db_version: Option<DbVersion>,
}

impl Default for SanitizerConfig<JsonStorage> {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            settings_file: "options.json".into(),
            app_name: "app".into(),
            settings_field: DEFAULT_SETTINGS_FIELD.into(),
            storage: JsonStorage::new(),
            db_version: None,
        }
    }
}

impl<S: StorageBackend> SanitizerConfig<S> {
    /// Full path of the bundle file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(&self.settings_file)
    }
}

impl SanitizerConfig<JsonStorage> {
    /// Create a new builder
    ///
    /// # Example
    /// ```rust
    /// use rcsan::SanitizerConfig;
    ///
    /// let config = SanitizerConfig::builder("my-site")
    ///     .config_dir("/tmp/my-site")
    ///     .settings_field("seo")
    ///     .build();
    ///
    /// assert_eq!(config.settings_path(), std::path::PathBuf::from("/tmp/my-site/options.json"));
    /// ```
    pub fn builder(app_name: impl Into<String>) -> SanitizerConfigBuilder {
        SanitizerConfigBuilder::new(app_name)
    }
}

/// Fluent builder for [`SanitizerConfig`]
#[derive(Debug, Clone)]
pub struct SanitizerConfigBuilder {
    config_dir: Option<PathBuf>,
    settings_file: String,
    app_name: String,
    settings_field: String,
    pretty_json: bool,
    db_version: Option<DbVersion>,
}

impl SanitizerConfigBuilder {
    /// Create a builder with the required app name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config_dir: None,
            settings_file: "options.json".into(),
            app_name: app_name.into(),
            settings_field: DEFAULT_SETTINGS_FIELD.into(),
            pretty_json: true,
            db_version: None,
        }
    }

    /// Set the configuration directory
    ///
    /// Supports `~` expansion for the home directory.
    #[must_use]
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(expand_home(path.into()));
        self
    }

    /// Set the bundle filename (default: "options.json")
    #[must_use]
    pub fn settings_file(mut self, filename: impl Into<String>) -> Self {
        self.settings_file = filename.into();
        self
    }

    /// Set the live bundle name (default: [`DEFAULT_SETTINGS_FIELD`])
    #[must_use]
    pub fn settings_field(mut self, field: impl Into<String>) -> Self {
        self.settings_field = field.into();
        self
    }

    /// Write the bundle file as single-line JSON
    #[must_use]
    pub fn compact_json(mut self) -> Self {
        self.pretty_json = false;
        self
    }

    /// Write `version` under `key` after every successful save
    #[must_use]
    pub fn db_version(mut self, key: impl Into<String>, version: impl Into<String>) -> Self {
        self.db_version = Some(DbVersion {
            key: key.into(),
            version: version.into(),
        });
        self
    }

    /// Build the config
    ///
    /// Without an explicit `config_dir` the platform config directory for the
    /// app is used, or the current directory when there is none.
    #[must_use]
    pub fn build(self) -> SanitizerConfig<JsonStorage> {
        let config_dir = self.config_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join(&self.app_name))
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let storage = if self.pretty_json {
            JsonStorage::new()
        } else {
            JsonStorage::compact()
        };

        SanitizerConfig {
            config_dir,
            settings_file: self.settings_file,
            app_name: self.app_name,
            settings_field: self.settings_field,
            storage,
            db_version: self.db_version,
        }
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let config = SanitizerConfig::builder("test-app").build();

        assert_eq!(config.app_name, "test-app");
        assert_eq!(config.settings_file, "options.json");
        assert_eq!(config.settings_field, DEFAULT_SETTINGS_FIELD);
        assert!(config.db_version.is_none());
    }

    #[test]
    fn test_builder_with_options() {
        let config = SanitizerConfig::builder("my-app")
            .config_dir("/tmp/my-app")
            .settings_file("seo.json")
            .settings_field("seo")
            .db_version("seo_db_version", "3103")
            .compact_json()
            .build();

        assert_eq!(config.settings_path(), PathBuf::from("/tmp/my-app/seo.json"));
        assert_eq!(config.settings_field, "seo");
        assert_eq!(
            config.db_version,
            Some(DbVersion {
                key: "seo_db_version".into(),
                version: "3103".into()
            })
        );
    }

    #[test]
    fn test_home_expansion() {
        let config = SanitizerConfig::builder("my-app").config_dir("~/sites").build();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.config_dir, home.join("sites"));
        }
    }
}
