//! # rcsan - Settings Sanitization Engine
//!
//! Validates option bundles on write. Every governed key (and, for compound
//! keys, every sub-key) is bound to a rule; a submitted value that fails its
//! rule falls back to the previously stored value or a static default, so a
//! bad form post can never store garbage.
//!
//! ## Features
//!
//! - **Rule Library**: closed set of serde-(de)serializable rules (enums,
//!   flags, bounded integers, one-line text, URLs, social handles, colors,
//!   post-type sets, chains)
//! - **Registry**: key/sub-key → rule bindings, built once
//! - **Dispatcher**: previous/default fallback, compound completeness,
//!   pass-through of ungoverned keys
//! - **Migrator**: post-commit compatibility keys, never re-entered
//! - **Stores**: in-memory, or a JSON file written atomically
//! - **Site catalog**: complete rule set for SEO site settings
//!
//! ## Quick Start
//!
//! ```rust
//! use rcsan::{OptionsManager, catalog::SITE_SETTINGS};
//! use serde_json::json;
//!
//! let manager = OptionsManager::builder("my-site")
//!     .with_site_catalog()
//!     .build_in_memory();
//!
//! let saved = manager
//!     .save(SITE_SETTINGS, &json!({
//!         "title_location": "center",
//!         "sitemap_query_limit": 999999,
//!         "twitter_site": "https://twitter.com/example/",
//!     }))
//!     .unwrap();
//!
//! assert_eq!(saved["title_location"], json!("right"));
//! assert_eq!(saved["sitemap_query_limit"], json!(50000));
//! assert_eq!(saved["twitter_site"], json!("@example"));
//! ```
//!
//! ## Custom Rules
//!
//! ```rust
//! use rcsan::{OptionsManager, Rule, StaticDefaults};
//! use serde_json::json;
//!
//! let manager = OptionsManager::builder("my-app")
//!     .with_catalog(|registry| {
//!         registry.define_rule("limit", Rule::clamp(1, 100))?;
//!         registry.define_rule("flag", Rule::Boolean)?;
//!         registry.register("limit", "feed", "items");
//!         registry.register("flag", "feed", ["full_text", "images"]);
//!         Ok(())
//!     })
//!     .with_defaults(StaticDefaults::new().with_sub("feed", "items", json!(10)))
//!     .build_in_memory();
//!
//! // Missing sub-keys are validated too
//! let saved = manager.save("feed", &json!({"items": 0})).unwrap();
//! assert_eq!(saved, json!({"items": 10, "full_text": 0, "images": 0}));
//! ```

// Core modules
mod error;
mod hooks;
mod manager;
mod sanitizer;
mod sync;

pub mod catalog;
pub mod config;
pub mod defaults;
pub mod migrate;
pub mod profile;
pub mod registry;
pub mod rules;
pub mod storage;
pub mod store;

// Re-exports
pub use config::{DbVersion, SanitizerConfig, SanitizerConfigBuilder};
pub use defaults::{DefaultsProvider, StaticDefaults};
pub use error::{Error, Result};
pub use hooks::{CommitCallback, CommitHooks};
pub use manager::{CatalogPass, OptionsManager, OptionsManagerBuilder};
pub use migrate::{CompatStep, Migrator};
pub use profile::{ProfileFields, sanitize_user_profile};
pub use registry::{Binding, Registry, SubKeys};
pub use rules::{Fallback, Rule};
pub use sanitizer::Sanitizer;
pub use storage::{JsonStorage, StorageBackend};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};

// =============================================================================
// Convenient Type Aliases
// =============================================================================

/// Manager persisting to a JSON bundle file
pub type FileManager = OptionsManager<JsonFileStore>;

/// Manager keeping everything in memory
///
/// # Example
/// ```
/// use rcsan::{MemoryManager, OptionsManager};
///
/// let manager: MemoryManager = OptionsManager::builder("my-app").build_in_memory();
/// assert!(manager.stored("anything").is_none());
/// ```
pub type MemoryManager = OptionsManager<MemoryStore>;
