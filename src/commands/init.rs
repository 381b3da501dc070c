/*!
 * dss init - create a manifest in the tracked directory
 *
 * Remote profiles are cloned from the default profiles file
 * (`~/.config/dss/remote` unless configured otherwise). Each clone gets a
 * fresh subdirectory appended to its base path so archives created from the
 * same defaults never share remote directories.
 */

use super::{print_json, CommandContext};
use crate::cli_style::{print_success, print_warning, stats_table, Theme};
use crate::error::Result;
use dss_core_manifest::{load_default_profiles, RemoteProfile};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Serialize)]
struct InitReport<'a> {
    manifest_id: Option<&'a str>,
    remotes: Vec<&'a str>,
}

/// Read default profiles; a missing file means none, a broken one is a warning
pub fn default_profiles(path: Option<&Path>) -> IndexMap<String, RemoteProfile> {
    let Some(path) = path else {
        debug!("No home directory, skipping default remote profiles");
        return IndexMap::new();
    };

    if !path.exists() {
        debug!("No default remote profiles at {}", path.display());
        return IndexMap::new();
    }

    match load_default_profiles(path) {
        Ok(profiles) => {
            debug!(
                "Loaded {} remote profile(s) from {}",
                profiles.len(),
                path.display()
            );
            profiles
        }
        Err(e) => {
            warn!("Ignoring default remote profiles: {}", e);
            print_warning(&format!(
                "Could not read default remote profiles from {}: {}",
                path.display(),
                e
            ));
            IndexMap::new()
        }
    }
}

pub fn run(ctx: &CommandContext, ref_path: Option<&str>) -> Result<()> {
    let defaults_path = ctx.config.defaults_path();
    let defaults = default_profiles(defaults_path.as_deref());
    let manifest = ctx.workspace.init(&defaults, ref_path)?;

    if ctx.json {
        return print_json(&InitReport {
            manifest_id: manifest.id(),
            remotes: manifest.remotes.keys().map(String::as_str).collect(),
        });
    }

    print_success(&format!(
        "Created {}",
        ctx.workspace.manifest_path().display()
    ));

    let mut items = vec![("Manifest", manifest.id().unwrap_or_default().to_string())];
    for (key, profile) in &manifest.remotes {
        items.push((
            key.as_str(),
            format!(
                "{}@{}:{}",
                profile.user.as_deref().unwrap_or("?"),
                profile.host.as_deref().unwrap_or("?"),
                profile.base_path.as_deref().unwrap_or("?")
            ),
        ));
    }
    println!("{}", stats_table(&items));

    if manifest.remotes.is_empty() {
        println!(
            "{}",
            Theme::muted("No default remote profiles; add remote@<id> entries to manifest.yml.")
        );
    }
    Ok(())
}
