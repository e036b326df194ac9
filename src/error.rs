//! Error types for rcsan
//!
//! Rules themselves never fail. Errors only come from configuration
//! (bad rule definitions) and from the persistence boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rcsan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rcsan
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Rule / Registry Errors
    // -------------------------------------------------------------------------
    #[error("Invalid rule definition for '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Commit of '{key}' failed: {reason}")]
    CommitFailed { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error came from the persistence boundary
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. }
                | Error::FileWrite { .. }
                | Error::DirectoryCreate { .. }
                | Error::CommitFailed { .. }
        )
    }
}
