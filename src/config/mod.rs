//! Configuration types
//!
//! - `SanitizerConfig` - where the bundle lives and what it is called
//! - `SanitizerConfigBuilder` - fluent construction with `~` expansion

mod types;

pub use types::{DEFAULT_SETTINGS_FIELD, DbVersion, SanitizerConfig, SanitizerConfigBuilder};
