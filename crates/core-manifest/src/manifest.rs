//! The manifest document and its persistence
//!
//! On disk the manifest is a YAML mapping with the known sections first
//! (`schema_version`, `manifest_id`, `datasets`), followed by every
//! `remote@<id>` profile and finally any keys this version does not know.
//! All maps keep insertion order so repeated saves produce identical text.

use crate::dataset::DatasetEntry;
use crate::error::{Error, Result};
use crate::remote::{remote_key, RemoteProfile, ResolvedRemote};
use crate::{generate_id, REMOTE_KEY_PREFIX, SCHEMA_VERSION};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use std::path::Path;

/// Persisted record of a tracked directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawManifest")]
pub struct Manifest {
    /// Schema version string
    pub schema_version: String,

    /// Archive-wide identifier; `None` only for legacy manifests
    pub manifest_id: Option<String>,

    /// Dataset entries keyed by file base name
    pub datasets: IndexMap<String, DatasetEntry>,

    /// Remote profiles keyed by `remote@<id>`
    pub remotes: IndexMap<String, RemoteProfile>,

    /// Unknown top-level keys, preserved as written
    pub extra: IndexMap<String, Value>,
}

/// Wire shape used while reading: known sections plus everything else
#[derive(Deserialize)]
struct RawManifest {
    #[serde(default, alias = "version", deserialize_with = "lenient_string")]
    schema_version: Option<String>,

    #[serde(default, alias = "manifest_uuid", deserialize_with = "lenient_string")]
    manifest_id: Option<String>,

    #[serde(default)]
    datasets: Option<IndexMap<String, DatasetEntry>>,

    #[serde(flatten)]
    rest: IndexMap<String, Value>,
}

/// Accept scalars of any kind (`version: 1.0` is a float in YAML)
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

impl TryFrom<RawManifest> for Manifest {
    type Error = String;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        let mut remotes = IndexMap::new();
        let mut extra = IndexMap::new();

        for (key, value) in raw.rest {
            if key.starts_with(REMOTE_KEY_PREFIX) {
                let profile: RemoteProfile = serde_yaml::from_value(value)
                    .map_err(|e| format!("invalid remote profile {}: {}", key, e))?;
                remotes.insert(key, profile);
            } else {
                extra.insert(key, value);
            }
        }

        Ok(Manifest {
            schema_version: raw
                .schema_version
                .unwrap_or_else(|| SCHEMA_VERSION.to_string()),
            manifest_id: raw.manifest_id.filter(|id| !id.trim().is_empty()),
            datasets: raw.datasets.unwrap_or_default(),
            remotes,
            extra,
        })
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = 2
            + usize::from(self.manifest_id.is_some())
            + self.remotes.len()
            + self.extra.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("schema_version", &self.schema_version)?;
        if let Some(id) = &self.manifest_id {
            map.serialize_entry("manifest_id", id)?;
        }
        map.serialize_entry("datasets", &self.datasets)?;
        for (key, profile) in &self.remotes {
            map.serialize_entry(key, profile)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            manifest_id: None,
            datasets: IndexMap::new(),
            remotes: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }
}

impl Manifest {
    /// Create an empty manifest with a freshly generated identifier
    pub fn new() -> Self {
        Self {
            manifest_id: Some(generate_id()),
            ..Default::default()
        }
    }

    /// Build a manifest for a new archive from systemwide default profiles.
    ///
    /// Each profile is cloned and its `base_path` gets a fresh unique
    /// subdirectory appended, so archives initialized from the same defaults
    /// never share remote directories. `local_ref_path`, when given, is set on
    /// every cloned profile.
    pub fn init_from_defaults(
        defaults: &IndexMap<String, RemoteProfile>,
        local_ref_path: Option<&str>,
    ) -> Self {
        let mut manifest = Self::new();

        for (key, profile) in defaults {
            let mut profile = profile.clone();
            if let Some(base) = profile.base_path.as_deref() {
                profile.base_path = Some(format!(
                    "{}/{}/",
                    base.trim_end_matches('/'),
                    generate_id()
                ));
            }
            if let Some(path) = local_ref_path.filter(|p| !p.trim().is_empty()) {
                profile.local_ref_path = Some(path.trim().to_string());
            }
            manifest.remotes.insert(key.clone(), profile);
        }

        manifest
    }

    /// Parse a manifest from YAML text. Blank text is an empty legacy manifest.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Serialize to YAML text
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load a manifest file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents).map_err(|e| Error::corrupt(path, e))
    }

    /// Save the manifest to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Make sure the manifest has an identifier.
    ///
    /// Returns `true` when one had to be generated; the caller must persist
    /// the manifest in that case.
    pub fn ensure_id(&mut self) -> bool {
        if self.manifest_id.is_some() {
            return false;
        }
        self.manifest_id = Some(generate_id());
        true
    }

    /// Identifier, if present
    pub fn id(&self) -> Option<&str> {
        self.manifest_id.as_deref()
    }

    /// Look up and validate the profile for a remote id (`"1"` for `remote@1`)
    pub fn resolve_remote(&self, id: &str) -> Result<Option<ResolvedRemote>> {
        let key = remote_key(id);
        self.remotes
            .get(&key)
            .map(|profile| profile.resolve(&key))
            .transpose()
    }
}
