/*!
 * Add, push, pull and mirror orchestration
 *
 * Every command loads the manifest once, runs all structural checks before
 * touching anything, processes files one at a time and writes the manifest
 * back at most once, at the end. Per-file problems become [`FileOutcome`]s;
 * only structural problems are errors.
 */

pub mod outcome;

use crate::core::checksum::digest_file;
use crate::core::diff::DiffEngine;
use crate::core::gitignore::ensure_gitignore;
use crate::error::{DssError, Result};
use crate::remote::{CommandOutput, Direction, RemoteCopy, RemotePresence, RemoteShell, RemoteTransport};
use dss_core_manifest::remote::relative_dataset_path;
use dss_core_manifest::{
    remote_key, timestamp_now, DatasetEntry, Manifest, RemoteProfile, ResolvedRemote,
    MANIFEST_FILE_NAME,
};
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

pub use outcome::{
    AddReport, DatasetStatus, FileOutcome, OutcomeKind, StatusReport, SyncReport, SyncSummary,
};

/// A tracked directory and the manifest inside it
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    pub fn load(&self) -> Result<Manifest> {
        Ok(Manifest::load(self.manifest_path())?)
    }

    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        manifest.save(self.manifest_path())?;
        debug!("Saved {}", self.manifest_path().display());
        Ok(())
    }

    /// Create a new manifest, cloning the given default profiles
    pub fn init(
        &self,
        defaults: &IndexMap<String, RemoteProfile>,
        local_ref_path: Option<&str>,
    ) -> Result<Manifest> {
        let path = self.manifest_path();
        if path.exists() {
            return Err(DssError::ManifestExists(path));
        }

        let manifest = Manifest::init_from_defaults(defaults, local_ref_path);
        self.save(&manifest)?;
        info!(
            "Created {} with {} remote profile(s)",
            MANIFEST_FILE_NAME,
            manifest.remotes.len()
        );
        Ok(manifest)
    }

    /// Track new files and refresh changed ones
    pub fn add<S: AsRef<str>>(&self, candidates: &[S]) -> Result<AddReport> {
        let mut manifest = self.load()?;
        let engine = DiffEngine::new(&self.dir)?;
        let plan = engine.evaluate(&manifest, candidates)?;

        if plan.eligible_count() == 0 {
            return Err(DssError::NoEligibleFiles);
        }

        let id_generated = manifest.ensure_id();
        if id_generated {
            info!("Generated manifest identifier {}", manifest.id().unwrap_or_default());
        }

        plan.apply(&mut manifest, &timestamp_now());
        let saved = id_generated || plan.has_changes();
        if saved {
            self.save(&manifest)?;
        }

        let report = AddReport {
            added: plan.added.iter().map(|c| c.name.clone()).collect(),
            updated: plan.updated.iter().map(|c| c.name.clone()).collect(),
            unchanged: plan.unchanged.clone(),
            rejected: plan.rejected.clone(),
            id_generated,
            saved,
        };
        if candidates.len() > 1 {
            info!(
                "Summary: {} added, {} updated, {} unchanged",
                report.added.len(),
                report.updated.len(),
                report.unchanged.len()
            );
        }
        Ok(report)
    }

    /// Compare tracked datasets with the files on disk; never writes
    pub fn status(&self) -> Result<StatusReport> {
        let manifest = self.load()?;
        let engine = DiffEngine::new(&self.dir)?;

        let datasets = engine
            .local_states(&manifest)?
            .into_iter()
            .map(|(name, state)| {
                let entry = manifest.datasets.get(&name);
                DatasetStatus {
                    size_human: entry.map(|e| e.size_human.clone()).unwrap_or_default(),
                    remotes: entry
                        .map(|e| e.remote_paths().map(|(key, _)| key.to_string()).collect())
                        .unwrap_or_default(),
                    name,
                    state,
                }
            })
            .collect();

        Ok(StatusReport {
            manifest_id: manifest.manifest_id.clone(),
            datasets,
            remotes: manifest.remotes.keys().cloned().collect(),
        })
    }
}

/// Look up and validate `remote@<id>`
pub fn resolve_remote(manifest: &Manifest, remote_id: &str) -> Result<ResolvedRemote> {
    manifest
        .resolve_remote(remote_id)?
        .ok_or_else(|| DssError::RemoteNotConfigured(remote_key(remote_id)))
}

/// A dataset name must be a plain base name so it always joins to a path
/// directly inside the tracked directory.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

/// Pick the datasets a push or pull works on.
///
/// No names means every dataset. Requested names that are not tracked, and
/// tracked names that are not plain base names, are returned as warnings.
pub fn select_datasets(manifest: &Manifest, names: &[String]) -> Result<(Vec<String>, Vec<String>)> {
    if manifest.datasets.is_empty() {
        return Err(DssError::NoDatasets);
    }

    let requested: Vec<&String> = if names.is_empty() {
        manifest.datasets.keys().collect()
    } else {
        names.iter().collect()
    };

    let mut selected: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    for name in requested {
        if !manifest.datasets.contains_key(name) {
            warn!("File not found in manifest, skipping: {}", name);
            warnings.push(name.clone());
        } else if !is_plain_name(name) {
            warn!("Dataset name is not a plain file name, skipping: {}", name);
            warnings.push(name.clone());
        } else if !selected.contains(name) {
            selected.push(name.clone());
        }
    }

    if selected.is_empty() {
        return Err(DssError::NoFilesSelected);
    }
    Ok((selected, warnings))
}

fn require_id(manifest: &Manifest) -> Result<String> {
    manifest
        .id()
        .map(str::to_string)
        .ok_or(DssError::MissingManifestId)
}

fn record_remote_path(manifest: &mut Manifest, name: &str, remote: &ResolvedRemote, path: &str) {
    manifest
        .datasets
        .entry(name.to_string())
        .or_insert_with(DatasetEntry::default)
        .set_remote_path(&remote.key, path);
}

/// Runs push, pull, list and mirror against one workspace
pub struct Orchestrator<'a, S, C> {
    workspace: &'a Workspace,
    transport: &'a RemoteTransport<S, C>,
}

impl<'a, S: RemoteShell, C: RemoteCopy> Orchestrator<'a, S, C> {
    pub fn new(workspace: &'a Workspace, transport: &'a RemoteTransport<S, C>) -> Self {
        Self {
            workspace,
            transport,
        }
    }

    fn ignore_staging_path(&self, remote: &ResolvedRemote) -> Result<()> {
        if let Some(path) = remote.local_ref_path.as_deref() {
            ensure_gitignore(self.workspace.dir(), path)?;
        }
        Ok(())
    }

    /// Upload datasets to `remote@<remote_id>`
    pub fn push(&self, remote_id: &str, names: &[String]) -> Result<SyncReport> {
        let mut manifest = self.workspace.load()?;
        let remote = resolve_remote(&manifest, remote_id)?;
        let (selected, warnings) = select_datasets(&manifest, names)?;

        let id_generated = manifest.ensure_id();
        let manifest_id = require_id(&manifest)?;
        if id_generated {
            info!("Generated manifest identifier {}", manifest_id);
        }
        self.ignore_staging_path(&remote)?;

        let mut report = SyncReport::new(Direction::Push, remote.key.clone(), manifest_id.clone());
        report.warnings = warnings;
        report.id_generated = id_generated;
        let mut dirty = id_generated;

        let remote_dir = remote.dataset_dir(&manifest_id);
        for name in &selected {
            let local = self.workspace.dir().join(name);
            if !local.is_file() {
                warn!("Local file not found: {}", name);
                report.record(FileOutcome::new(name, OutcomeKind::LocalMissing));
                continue;
            }

            info!("Creating remote directory: {}", remote_dir);
            if let Err(failure) = self.transport.ensure_dir(&remote, &remote_dir) {
                warn!("Failed to create remote directory for {}: {}", name, failure);
                report.record(
                    FileOutcome::new(name, OutcomeKind::RemoteDirFailed).with_detail(failure.message),
                );
                continue;
            }

            let remote_path = remote.dataset_path(&manifest_id, name);
            info!("Pushing {} to {}", name, remote.remote_spec(&remote_path));
            match self.transport.transfer(
                &remote,
                &local.to_string_lossy(),
                &remote_path,
                Direction::Push,
            ) {
                Ok(output) => {
                    debug!("{}", output.stdout.trim_end());
                    let relative = relative_dataset_path(&manifest_id, name);
                    record_remote_path(&mut manifest, name, &remote, &relative);
                    dirty = true;
                    info!("Successfully pushed: {}", name);
                    report.record(
                        FileOutcome::new(name, OutcomeKind::Pushed).with_remote_path(relative),
                    );
                }
                Err(failure) => {
                    warn!("Failed to push {}: {}", name, failure);
                    report.record(
                        FileOutcome::new(name, OutcomeKind::TransferFailed).with_detail(failure.message),
                    );
                }
            }
        }

        if dirty {
            self.workspace.save(&manifest)?;
            report.saved = true;
        }
        log_summary(&report);
        Ok(report)
    }

    /// Download datasets from `remote@<remote_id>` and verify their digests
    pub fn pull(&self, remote_id: &str, names: &[String]) -> Result<SyncReport> {
        let mut manifest = self.workspace.load()?;
        let remote = resolve_remote(&manifest, remote_id)?;
        let (selected, warnings) = select_datasets(&manifest, names)?;
        let manifest_id = require_id(&manifest)?;
        self.ignore_staging_path(&remote)?;

        let mut report = SyncReport::new(Direction::Pull, remote.key.clone(), manifest_id.clone());
        report.warnings = warnings;
        let mut dirty = false;

        for name in &selected {
            let remote_path = remote.dataset_path(&manifest_id, name);

            match self.transport.exists(&remote, &remote_path) {
                RemotePresence::Present => {}
                RemotePresence::Absent => {
                    warn!("Remote file not found: {}", remote_path);
                    report.record(FileOutcome::new(name, OutcomeKind::RemoteMissing));
                    continue;
                }
                RemotePresence::Unknown(message) => {
                    warn!("Could not check remote file {}: {}", remote_path, message);
                    report.record(
                        FileOutcome::new(name, OutcomeKind::RemoteCheckFailed).with_detail(message),
                    );
                    continue;
                }
            }

            let local = self.workspace.dir().join(name);
            info!("Pulling {} from {}", name, remote.remote_spec(&remote_path));
            if let Err(failure) = self.transport.transfer(
                &remote,
                &local.to_string_lossy(),
                &remote_path,
                Direction::Pull,
            ) {
                warn!("Failed to pull {}: {}", name, failure);
                report.record(
                    FileOutcome::new(name, OutcomeKind::TransferFailed).with_detail(failure.message),
                );
                continue;
            }

            let actual = match digest_file(&local) {
                Ok(digest) => digest,
                Err(DssError::SourceNotFound(_)) => {
                    warn!("File downloaded but not found locally: {}", name);
                    report.record(
                        FileOutcome::new(name, OutcomeKind::TransferFailed)
                            .with_detail("copy succeeded but the file is missing locally"),
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            let expected = manifest
                .datasets
                .get(name)
                .map(|entry| entry.digest.clone())
                .unwrap_or_default();
            let relative = relative_dataset_path(&manifest_id, name);
            let outcome = if actual.digest == expected {
                info!("Successfully pulled: {} (digest verified)", name);
                FileOutcome::new(name, OutcomeKind::Verified)
            } else {
                warn!(
                    "Pulled {} but digest mismatch! Expected: {}, Got: {}",
                    name, expected, actual.digest
                );
                FileOutcome::new(name, OutcomeKind::IntegrityMismatch)
                    .with_detail(format!("expected {}, got {}", expected, actual.digest))
            };

            record_remote_path(&mut manifest, name, &remote, &relative);
            dirty = true;
            report.record(outcome.with_remote_path(relative));
        }

        if dirty {
            self.workspace.save(&manifest)?;
            report.saved = true;
        }
        log_summary(&report);
        Ok(report)
    }

    /// `ls -lh` of this archive's directory on the remote
    pub fn list(&self, remote_id: &str) -> Result<CommandOutput> {
        let manifest = self.workspace.load()?;
        let remote = resolve_remote(&manifest, remote_id)?;
        let manifest_id = require_id(&manifest)?;

        let dir = remote.dataset_dir(&manifest_id);
        let command = format!("ls -lh {}", crate::remote::shell_quote(&dir));
        self.transport
            .run(&remote, &command)
            .map_err(|failure| DssError::Remote {
                operation: "list".to_string(),
                stderr: failure.to_string(),
            })
    }

    /// Sync the profile's staging directory wholesale with its base path.
    ///
    /// `subpath` narrows a pull to one path below the base path. The manifest
    /// is never modified.
    pub fn mirror(
        &self,
        remote_id: &str,
        direction: Direction,
        subpath: Option<&str>,
    ) -> Result<CommandOutput> {
        let manifest = self.workspace.load()?;
        let remote = resolve_remote(&manifest, remote_id)?;
        let staging = remote
            .local_ref_path
            .clone()
            .ok_or_else(|| DssError::NoStagingPath(remote.key.clone()))?;
        ensure_gitignore(self.workspace.dir(), &staging)?;

        let local_dir = self.workspace.dir().join(&staging);
        let local = format!("{}/", local_dir.to_string_lossy().trim_end_matches('/'));
        let operation = match direction {
            Direction::Push => "mirror push",
            Direction::Pull => "mirror pull",
        };
        let remote_failure = |failure: crate::remote::TransportFailure| DssError::Remote {
            operation: operation.to_string(),
            stderr: failure.to_string(),
        };

        match direction {
            Direction::Push => {
                self.transport
                    .ensure_dir(&remote, &remote.base_path)
                    .map_err(remote_failure)?;
                info!("Pushing {} to {}", staging, remote.remote_spec(&remote.base_path));
                self.transport
                    .transfer(&remote, &local, &remote.base_path, Direction::Push)
                    .map_err(remote_failure)
            }
            Direction::Pull => {
                std::fs::create_dir_all(&local_dir)?;
                let source = format!(
                    "{}{}",
                    remote.base_path,
                    subpath.map(|p| p.trim_start_matches('/')).unwrap_or_default()
                );
                info!("Pulling {} into {}", remote.remote_spec(&source), staging);
                self.transport
                    .transfer(&remote, &local, &source, Direction::Pull)
                    .map_err(remote_failure)
            }
        }
    }
}

fn log_summary(report: &SyncReport) {
    let summary = report.summary();
    if summary.total <= 1 {
        return;
    }
    match report.direction {
        Direction::Push => info!(
            "Push summary: {} pushed, {} failed, {} missing",
            summary.transferred, summary.failed, summary.missing
        ),
        Direction::Pull => info!(
            "Pull summary: {} verified, {} mismatched, {} missing, {} failed",
            summary.verified, summary.integrity_mismatch, summary.missing, summary.failed
        ),
    }
}
