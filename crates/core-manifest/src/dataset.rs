//! Dataset entries: the per-file record inside a manifest
//!
//! Besides the fixed fields, an entry carries an open bag of extra fields. It
//! holds the `remote@<id>` relative paths written after confirmed transfers,
//! and any legacy fields (such as the per-file `uuid` of older manifests) that
//! must survive a load/save cycle unchanged.

use crate::REMOTE_KEY_PREFIX;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Metadata for a single tracked file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// SHA-256 content digest, lowercase hex
    #[serde(default, alias = "sha256")]
    pub digest: String,

    /// File size in bytes
    #[serde(default)]
    pub size_bytes: u64,

    /// Human readable size (base 1024, e.g. "1.5M")
    #[serde(default)]
    pub size_human: String,

    /// When the current digest was recorded (UTC, ISO-8601 with `Z`)
    #[serde(default, alias = "uploaded")]
    pub recorded_at: String,

    /// Free text description
    #[serde(default)]
    pub description: String,

    /// Per-remote relative paths and legacy fields, in document order
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl DatasetEntry {
    /// Create an entry for a newly tracked file with an empty description
    pub fn new(
        digest: impl Into<String>,
        size_bytes: u64,
        size_human: impl Into<String>,
        recorded_at: impl Into<String>,
    ) -> Self {
        Self {
            digest: digest.into(),
            size_bytes,
            size_human: size_human.into(),
            recorded_at: recorded_at.into(),
            description: String::new(),
            fields: IndexMap::new(),
        }
    }

    /// Overwrite content metadata after the file changed.
    ///
    /// Description, remote paths and legacy fields are left alone.
    pub fn refresh(
        &mut self,
        digest: impl Into<String>,
        size_bytes: u64,
        size_human: impl Into<String>,
        recorded_at: impl Into<String>,
    ) {
        self.digest = digest.into();
        self.size_bytes = size_bytes;
        self.size_human = size_human.into();
        self.recorded_at = recorded_at.into();
    }

    /// Path of this dataset relative to a remote's base path, if one was recorded
    pub fn remote_path(&self, remote_key: &str) -> Option<&str> {
        self.fields.get(remote_key).and_then(Value::as_str)
    }

    /// Record the location of this dataset on a remote
    pub fn set_remote_path(&mut self, remote_key: &str, path: impl Into<String>) {
        self.fields
            .insert(remote_key.to_string(), Value::String(path.into()));
    }

    /// All recorded `(remote key, relative path)` pairs in document order
    pub fn remote_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(key, value)| {
            if key.starts_with(REMOTE_KEY_PREFIX) {
                value.as_str().map(|path| (key.as_str(), path))
            } else {
                None
            }
        })
    }

    /// Fields that are neither known fields nor remote paths
    pub fn legacy_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| !key.starts_with(REMOTE_KEY_PREFIX))
    }
}
