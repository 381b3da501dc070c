/*!
 * Command handlers behind the `dss` binary
 *
 * Each handler drives the library and renders its structured report, either
 * as styled tables or as JSON.
 */

pub mod add;
pub mod init;
pub mod list;
pub mod mirror;
pub mod status;
pub mod sync;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::remote::{RemoteTransport, RsyncCopy, SshShell};
use crate::sync::Workspace;
use serde::Serialize;

/// Shared state for one invocation
pub struct CommandContext {
    pub workspace: Workspace,
    pub config: SyncConfig,
    /// Print machine-readable JSON instead of styled output
    pub json: bool,
}

impl CommandContext {
    pub fn new(workspace: Workspace, config: SyncConfig, json: bool) -> Self {
        Self {
            workspace,
            config,
            json,
        }
    }

    /// Remote id from `--remote`, falling back to the configured default
    pub fn remote_id(&self, requested: Option<String>) -> String {
        requested.unwrap_or_else(|| self.config.default_remote.clone())
    }

    /// ssh/rsync transport built from configuration
    pub fn transport(&self) -> RemoteTransport<SshShell, RsyncCopy> {
        RemoteTransport::new(
            SshShell::from_config(&self.config),
            RsyncCopy::from_config(&self.config),
        )
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", text);
    Ok(())
}
