//! In-process stand-ins for ssh and rsync
//!
//! A local directory plays the remote host: remote absolute paths are mapped
//! below it. Failures are scripted per call so tests can break exactly one
//! step of a run.

#![allow(dead_code)]

use dss::remote::{CommandOutput, CopyRequest, Direction, RemoteCopy, RemoteShell, RemoteTransport};
use dss_core_manifest::{RemoteProfile, ResolvedRemote};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn unquote(arg: &str) -> String {
    let arg = arg.trim();
    let inner = arg
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(arg);
    inner.replace(r"'\''", "'")
}

fn map_remote(root: &Path, remote_path: &str) -> PathBuf {
    root.join(remote_path.trim_start_matches('/'))
}

/// Fake `ssh` understanding `mkdir -p`, `test -e` and `ls -lh`
pub struct FakeShell {
    root: PathBuf,
    /// Number of upcoming `mkdir` calls that fail
    pub mkdir_failures: RefCell<usize>,
    /// Exit status forced on every `test -e` probe
    pub probe_status: Option<i32>,
    pub commands: RefCell<Vec<String>>,
}

impl FakeShell {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            mkdir_failures: RefCell::new(0),
            probe_status: None,
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_mkdir(root: &Path, count: usize) -> Self {
        let shell = Self::new(root);
        *shell.mkdir_failures.borrow_mut() = count;
        shell
    }
}

impl RemoteShell for FakeShell {
    fn run(&self, _remote: &ResolvedRemote, command: &str) -> io::Result<CommandOutput> {
        self.commands.borrow_mut().push(command.to_string());

        if let Some(dir) = command.strip_prefix("mkdir -p ") {
            let mut failures = self.mkdir_failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Ok(CommandOutput::new(
                    255,
                    "",
                    "ssh: connect to host archive port 22: Network is unreachable\n",
                ));
            }
            fs::create_dir_all(map_remote(&self.root, &unquote(dir)))?;
            return Ok(CommandOutput::new(0, "", ""));
        }

        if let Some(path) = command.strip_prefix("test -e ") {
            if let Some(status) = self.probe_status {
                return Ok(CommandOutput::new(status, "", "Permission denied (publickey).\n"));
            }
            let exists = map_remote(&self.root, &unquote(path)).exists();
            return Ok(CommandOutput::new(if exists { 0 } else { 1 }, "", ""));
        }

        if let Some(dir) = command.strip_prefix("ls -lh ") {
            let dir = unquote(dir);
            let local = map_remote(&self.root, &dir);
            if !local.is_dir() {
                return Ok(CommandOutput::new(
                    2,
                    "",
                    format!("ls: cannot access '{}': No such file or directory\n", dir),
                ));
            }
            let mut names: Vec<String> = fs::read_dir(local)?
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            let listing: String = names.iter().map(|n| format!("{}\n", n)).collect();
            return Ok(CommandOutput::new(0, listing, ""));
        }

        Ok(CommandOutput::new(127, "", format!("unknown command: {}\n", command)))
    }
}

/// Fake `rsync` copying between the working tree and the fake remote root
pub struct FakeCopy {
    root: PathBuf,
    /// Base names whose copy exits non-zero
    pub failing: Vec<String>,
    pub requests: RefCell<Vec<CopyRequest>>,
}

impl FakeCopy {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            failing: Vec::new(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let target = to.join(&name);
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

impl RemoteCopy for FakeCopy {
    fn copy(&self, _remote: &ResolvedRemote, request: &CopyRequest) -> io::Result<CommandOutput> {
        self.requests.borrow_mut().push(request.clone());

        let remote = map_remote(&self.root, &request.remote_path);
        let local = PathBuf::from(request.local.trim_end_matches('/'));
        let (from, to) = match request.direction {
            Direction::Push => (local, remote),
            Direction::Pull => (remote, local),
        };

        let name = from
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&name) {
            return Ok(CommandOutput::new(
                23,
                "",
                "rsync error: some files/attrs were not transferred (code 23)\n",
            ));
        }

        if from.is_dir() {
            copy_tree(&from, &to)?;
            return Ok(CommandOutput::new(0, "sending incremental file list\n", ""));
        }

        match to.parent() {
            Some(parent) if parent.is_dir() => {}
            _ => {
                return Ok(CommandOutput::new(
                    11,
                    "",
                    "rsync: mkdir failed: No such file or directory (2)\n",
                ))
            }
        }
        match fs::copy(&from, &to) {
            Ok(_) => Ok(CommandOutput::new(0, format!("{}\n", name), "")),
            Err(e) => Ok(CommandOutput::new(23, "", format!("rsync: {}\n", e))),
        }
    }
}

pub type FakeTransport = RemoteTransport<FakeShell, FakeCopy>;

pub fn transport(root: &Path) -> FakeTransport {
    RemoteTransport::new(FakeShell::new(root), FakeCopy::new(root))
}

/// Default profiles as `init` would read them from the defaults file
pub fn default_profiles() -> indexmap::IndexMap<String, RemoteProfile> {
    let mut profiles = indexmap::IndexMap::new();
    profiles.insert(
        "remote@1".to_string(),
        RemoteProfile::new("archivist", "archive.example.org", "/srv/archive"),
    );
    profiles
}
