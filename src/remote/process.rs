/*!
 * ssh and rsync subprocess collaborators
 */

use super::{CommandOutput, CopyRequest, Direction, RemoteCopy, RemoteShell};
use crate::config::SyncConfig;
use dss_core_manifest::ResolvedRemote;
use std::io;
use std::process::Command;

/// Pattern handed to rsync so dotfiles never leave the tracked directory
pub const DOTFILE_EXCLUDE: &str = "--exclude=.[!.]*";

/// Runs remote commands through the ssh binary
#[derive(Debug, Clone)]
pub struct SshShell {
    program: String,
    options: Vec<String>,
}

impl SshShell {
    pub fn new(program: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.ssh_program.clone(), config.ssh_options.clone())
    }

    /// Arguments for one invocation: options, port, login, command
    pub fn args(&self, remote: &ResolvedRemote, command: &str) -> Vec<String> {
        let mut args = self.options.clone();
        args.push("-p".to_string());
        args.push(remote.port.to_string());
        args.push(remote.login());
        args.push(command.to_string());
        args
    }
}

impl RemoteShell for SshShell {
    fn run(&self, remote: &ResolvedRemote, command: &str) -> io::Result<CommandOutput> {
        let output = Command::new(&self.program)
            .args(self.args(remote, command))
            .output()?;
        Ok(output.into())
    }
}

/// Copies files with rsync over ssh
#[derive(Debug, Clone)]
pub struct RsyncCopy {
    program: String,
    flags: Vec<String>,
    ssh_program: String,
    ssh_options: Vec<String>,
}

impl RsyncCopy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            program: config.rsync_program.clone(),
            flags: config.rsync_flags.clone(),
            ssh_program: config.ssh_program.clone(),
            ssh_options: config.ssh_options.clone(),
        }
    }

    /// Remote shell string passed with `-e`
    pub fn transport_command(&self, port: u16) -> String {
        let mut parts = vec![self.ssh_program.clone(), "-p".to_string(), port.to_string()];
        parts.extend(self.ssh_options.iter().cloned());
        parts.join(" ")
    }

    pub fn args(&self, remote: &ResolvedRemote, request: &CopyRequest) -> Vec<String> {
        let remote_spec = remote.remote_spec(&request.remote_path);
        let (source, destination) = match request.direction {
            Direction::Push => (request.local.clone(), remote_spec),
            Direction::Pull => (remote_spec, request.local.clone()),
        };

        let mut args = self.flags.clone();
        args.push("-e".to_string());
        args.push(self.transport_command(remote.port));
        args.push(DOTFILE_EXCLUDE.to_string());
        args.push(source);
        args.push(destination);
        args
    }
}

impl RemoteCopy for RsyncCopy {
    fn copy(&self, remote: &ResolvedRemote, request: &CopyRequest) -> io::Result<CommandOutput> {
        let output = Command::new(&self.program)
            .args(self.args(remote, request))
            .output()?;
        Ok(output.into())
    }
}
