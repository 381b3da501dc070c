//! Systemwide default remote profiles used when a new manifest is created

use crate::error::{Error, Result};
use crate::remote::RemoteProfile;
use crate::REMOTE_KEY_PREFIX;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::path::Path;

/// Load `remote@<id>` profiles from a defaults file.
///
/// The file is a YAML mapping shaped like the remote section of a manifest.
/// Keys outside the `remote@` namespace are ignored. A missing file yields
/// no profiles; a file that exists but cannot be parsed is an error.
pub fn load_default_profiles<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, RemoteProfile>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(IndexMap::new());
    }

    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(IndexMap::new());
    }

    let document: IndexMap<String, Value> =
        serde_yaml::from_str(&contents).map_err(|e| Error::corrupt(path, e))?;

    let mut profiles = IndexMap::new();
    for (key, value) in document {
        if !key.starts_with(REMOTE_KEY_PREFIX) {
            continue;
        }
        let profile: RemoteProfile =
            serde_yaml::from_value(value).map_err(|e| Error::InvalidRemote {
                key: key.clone(),
                message: e.to_string(),
            })?;
        profiles.insert(key, profile);
    }

    Ok(profiles)
}
