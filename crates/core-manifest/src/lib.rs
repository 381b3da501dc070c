//! Core manifest data structures for dss
//!
//! A manifest is the persisted record of a tracked dataset directory. It lives
//! next to the data as `manifest.yml` and holds:
//!
//! - **Manifest identifier**: generated once, namespaces every dataset path on every remote
//! - **Datasets**: per-file digest, size, timestamp, description and per-remote paths
//! - **Remote profiles**: `remote@<id>` connection parameters (user, host, port, base path)
//!
//! The document is meant to be edited by hand and kept under version control, so
//! loading and saving preserve key order and carry unknown fields through untouched.
//!
//! # Example
//!
//! ```no_run
//! use dss_core_manifest::Manifest;
//!
//! let mut manifest = Manifest::load("manifest.yml")?;
//! if manifest.ensure_id() {
//!     manifest.save("manifest.yml")?;
//! }
//! # Ok::<(), dss_core_manifest::Error>(())
//! ```

pub mod dataset;
pub mod defaults;
pub mod error;
pub mod manifest;
pub mod remote;

// Re-export main types for convenience
pub use dataset::DatasetEntry;
pub use defaults::load_default_profiles;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use remote::{remote_key, RemoteProfile, ResolvedRemote};

/// Schema version written to new manifests
pub const SCHEMA_VERSION: &str = "1.0";

/// File name of the manifest inside a tracked directory
pub const MANIFEST_FILE_NAME: &str = "manifest.yml";

/// Prefix shared by remote profile keys and per-dataset remote path fields
pub const REMOTE_KEY_PREFIX: &str = "remote@";

/// Port used when a profile does not name one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Current UTC time in the manifest's timestamp format (ISO-8601, `Z` suffix)
pub fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}

/// Generate a fresh unique identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
