/*!
 * Remote transport primitives
 *
 * Three operations built on two collaborators:
 *
 * - [`RemoteShell`] runs one command on a remote host and reports exit status,
 *   stdout and stderr.
 * - [`RemoteCopy`] copies a file or tree between a local path and a remote
 *   path, excluding dotfiles.
 *
 * [`RemoteTransport`] turns those into `ensure_dir`, `exists` and `transfer`.
 * Success is decided by exit status alone; output is only surfaced for
 * diagnostics. [`process`] holds the ssh/rsync implementations.
 */

pub mod process;

use dss_core_manifest::ResolvedRemote;
use serde::Serialize;
use std::fmt;
use std::io;
use tracing::debug;

pub use process::{RsyncCopy, SshShell};

/// Exit status of `test -e` when the path does not exist
const TEST_ABSENT_STATUS: i32 = 1;

/// Captured result of one collaborator invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs a command on a remote host
pub trait RemoteShell {
    fn run(&self, remote: &ResolvedRemote, command: &str) -> io::Result<CommandOutput>;
}

/// Which way bytes flow in a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// local -> remote
    Push,
    /// remote -> local
    Pull,
}

/// One copy between a local path and a path on the remote host.
///
/// Paths are passed through verbatim, so a trailing `/` on a directory keeps
/// rsync's "copy contents" meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub local: String,
    pub remote_path: String,
    pub direction: Direction,
}

/// Copies files between the local machine and a remote host
pub trait RemoteCopy {
    fn copy(&self, remote: &ResolvedRemote, request: &CopyRequest) -> io::Result<CommandOutput>;
}

/// A remote operation that did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Exit code, `None` if the collaborator could not be started or was killed
    pub status: Option<i32>,
    /// Remote stderr verbatim, or the OS error when spawning failed
    pub message: String,
}

impl TransportFailure {
    fn from_output(output: CommandOutput) -> Self {
        Self {
            status: output.status,
            message: output.stderr,
        }
    }

    fn spawn(err: io::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message.trim_end();
        match (self.status, message.is_empty()) {
            (Some(code), true) => write!(f, "exit status {}", code),
            (Some(code), false) => write!(f, "exit status {}: {}", code, message),
            (None, true) => write!(f, "terminated without exit status"),
            (None, false) => f.write_str(message),
        }
    }
}

/// Result of probing a remote path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemotePresence {
    Present,
    Absent,
    /// The probe itself failed (connection, permissions); carries stderr
    Unknown(String),
}

/// Quote a value for a POSIX shell using single quotes
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Remote directory creation, existence checks and copies for one invocation
pub struct RemoteTransport<S, C> {
    shell: S,
    copier: C,
}

impl<S: RemoteShell, C: RemoteCopy> RemoteTransport<S, C> {
    pub fn new(shell: S, copier: C) -> Self {
        Self { shell, copier }
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn copier(&self) -> &C {
        &self.copier
    }

    /// Run a command and require exit status 0
    pub fn run(&self, remote: &ResolvedRemote, command: &str) -> Result<CommandOutput, TransportFailure> {
        debug!("{}: {}", remote.login(), command);
        let output = self
            .shell
            .run(remote, command)
            .map_err(TransportFailure::spawn)?;
        if output.success() {
            Ok(output)
        } else {
            Err(TransportFailure::from_output(output))
        }
    }

    /// Create a remote directory and its parents; succeeds if it already exists
    pub fn ensure_dir(&self, remote: &ResolvedRemote, dir: &str) -> Result<(), TransportFailure> {
        self.run(remote, &format!("mkdir -p {}", shell_quote(dir)))
            .map(|_| ())
    }

    /// Probe a remote path.
    ///
    /// Exit 0 means present and exit 1 means absent. Anything else, or a
    /// failure to start the probe, is [`RemotePresence::Unknown`].
    pub fn exists(&self, remote: &ResolvedRemote, path: &str) -> RemotePresence {
        let command = format!("test -e {}", shell_quote(path));
        debug!("{}: {}", remote.login(), command);
        match self.shell.run(remote, &command) {
            Ok(output) if output.success() => RemotePresence::Present,
            Ok(output) if output.status == Some(TEST_ABSENT_STATUS) => RemotePresence::Absent,
            Ok(output) => RemotePresence::Unknown(TransportFailure::from_output(output).to_string()),
            Err(e) => RemotePresence::Unknown(e.to_string()),
        }
    }

    /// Copy bytes in either direction; success is the copy's exit status
    pub fn transfer(
        &self,
        remote: &ResolvedRemote,
        local: &str,
        remote_path: &str,
        direction: Direction,
    ) -> Result<CommandOutput, TransportFailure> {
        let request = CopyRequest {
            local: local.to_string(),
            remote_path: remote_path.to_string(),
            direction,
        };
        debug!(
            "copy {:?}: {} <-> {}",
            direction,
            local,
            remote.remote_spec(remote_path)
        );
        let output = self
            .copier
            .copy(remote, &request)
            .map_err(TransportFailure::spawn)?;
        if output.success() {
            Ok(output)
        } else {
            Err(TransportFailure::from_output(output))
        }
    }
}
