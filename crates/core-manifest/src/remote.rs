//! Remote profiles: connection parameters for one `remote@<id>` destination

use crate::error::{Error, Result};
use crate::{DEFAULT_SSH_PORT, REMOTE_KEY_PREFIX};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Build the profile key for a remote id (`"1"` -> `"remote@1"`)
pub fn remote_key(id: &str) -> String {
    format!("{}{}", REMOTE_KEY_PREFIX, id)
}

/// Remote profile as stored in the manifest.
///
/// Every field is optional on disk so that an incomplete profile still loads
/// and round-trips; [`RemoteProfile::resolve`] enforces what a transfer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfile {
    /// Login name on the remote host
    #[serde(default, alias = "uname", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Hostname or address
    #[serde(default, alias = "url", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Directory prefix on the remote host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// SSH port (22 when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Local staging subdirectory synced wholesale by `mirror`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_ref_path: Option<String>,

    /// Unknown profile keys, preserved as written
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A profile that passed validation, ready to build remote commands from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRemote {
    /// Profile key this was resolved from (`remote@<id>`)
    pub key: String,
    pub user: String,
    pub host: String,
    pub port: u16,
    /// Base path, always ending with `/`
    pub base_path: String,
    /// Staging directory, when configured and non-empty
    pub local_ref_path: Option<String>,
}

impl RemoteProfile {
    /// Create a profile with the three required fields
    pub fn new(
        user: impl Into<String>,
        host: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            user: Some(user.into()),
            host: Some(host.into()),
            base_path: Some(base_path.into()),
            ..Default::default()
        }
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the local staging path
    pub fn with_local_ref_path(mut self, path: impl Into<String>) -> Self {
        self.local_ref_path = Some(path.into());
        self
    }

    /// Effective port
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// Validate required fields and normalize the base path.
    ///
    /// Fields are checked in the order `user`, `host`, `base_path`; the first
    /// missing or blank one is reported.
    pub fn resolve(&self, key: &str) -> Result<ResolvedRemote> {
        let user = required(key, "user", &self.user)?;
        let host = required(key, "host", &self.host)?;
        let base_path = required(key, "base_path", &self.base_path)?;

        Ok(ResolvedRemote {
            key: key.to_string(),
            user,
            host,
            port: self.port_or_default(),
            base_path: normalize_base_path(&base_path),
            local_ref_path: self
                .local_ref_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        })
    }
}

fn required(key: &str, field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::missing_field(key, field)),
    }
}

/// Ensure a base path ends with exactly one trailing `/`
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_end_matches('/');
    format!("{}/", trimmed)
}

impl ResolvedRemote {
    /// `user@host` login string
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Directory holding this archive's datasets: `<base_path><manifest_id>`
    pub fn dataset_dir(&self, manifest_id: &str) -> String {
        format!("{}{}", self.base_path, manifest_id)
    }

    /// Absolute remote path of one dataset
    pub fn dataset_path(&self, manifest_id: &str, name: &str) -> String {
        format!("{}/{}", self.dataset_dir(manifest_id), name)
    }

    /// rsync-style `user@host:path` spec for a remote path
    pub fn remote_spec(&self, path: &str) -> String {
        format!("{}:{}", self.login(), path)
    }
}

/// Path of a dataset relative to any remote's base path
pub fn relative_dataset_path(manifest_id: &str, name: &str) -> String {
    format!("{}/{}", manifest_id, name)
}
