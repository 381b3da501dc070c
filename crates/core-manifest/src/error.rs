//! Error types for manifest operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during manifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Manifest file not found
    #[error("Manifest not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Manifest exists but could not be parsed
    #[error("Manifest {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Remote profile lacks a field needed to reach the host
    #[error("Missing required remote configuration for {remote}: {field}")]
    MissingField { remote: String, field: String },

    /// Key in the `remote@` namespace holds something other than a profile
    #[error("Invalid remote profile {key}: {message}")]
    InvalidRemote { key: String, message: String },
}

impl Error {
    /// Create a manifest not found error
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create a corrupt manifest error
    pub fn corrupt<P: Into<PathBuf>>(path: P, source: serde_yaml::Error) -> Self {
        Error::Corrupt {
            path: path.into(),
            source,
        }
    }

    /// Create a missing field error
    pub fn missing_field<S: Into<String>>(remote: S, field: S) -> Self {
        Error::MissingField {
            remote: remote.into(),
            field: field.into(),
        }
    }

    /// True when the manifest file simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
