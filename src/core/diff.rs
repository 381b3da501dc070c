/*!
 * Classify candidate files against the manifest
 *
 * Evaluation never touches the manifest. It returns a [`DiffPlan`] that the
 * caller applies and persists once, after every candidate was looked at.
 */

use crate::core::checksum::{digest_file, format_size, FileDigest};
use crate::error::{DssError, Result};
use dss_core_manifest::{DatasetEntry, Manifest, MANIFEST_FILE_NAME};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a candidate path was not considered for tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotFound,
    IsDirectory,
    Hidden,
    NotRegularFile,
    IsManifest,
    WrongDirectory,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotFound => "not_found",
            RejectReason::IsDirectory => "is_directory",
            RejectReason::Hidden => "hidden",
            RejectReason::NotRegularFile => "not_regular_file",
            RejectReason::IsManifest => "is_manifest",
            RejectReason::WrongDirectory => "wrong_directory",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Candidate as given by the caller
    pub path: String,
    pub reason: RejectReason,
}

/// An eligible file together with its freshly computed digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Dataset name (the file's base name)
    pub name: String,
    pub path: PathBuf,
    pub digest: FileDigest,
}

/// Outcome of evaluating a batch of candidates
#[derive(Debug, Default)]
pub struct DiffPlan {
    pub added: Vec<Candidate>,
    pub updated: Vec<Candidate>,
    pub unchanged: Vec<String>,
    pub rejected: Vec<Rejection>,
}

impl DiffPlan {
    /// Number of candidates that passed the eligibility filter
    pub fn eligible_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.unchanged.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }

    /// Write added and updated entries into the manifest.
    ///
    /// Updated entries keep their description, remote paths and legacy
    /// fields. Unchanged entries are not touched. Returns the number of
    /// entries written.
    pub fn apply(&self, manifest: &mut Manifest, recorded_at: &str) -> usize {
        for candidate in &self.added {
            let entry = DatasetEntry::new(
                candidate.digest.digest.clone(),
                candidate.digest.size_bytes,
                candidate.digest.size_human(),
                recorded_at,
            );
            manifest.datasets.insert(candidate.name.clone(), entry);
        }

        for candidate in &self.updated {
            let digest = &candidate.digest;
            manifest
                .datasets
                .entry(candidate.name.clone())
                .or_default()
                .refresh(
                    digest.digest.clone(),
                    digest.size_bytes,
                    format_size(digest.size_bytes),
                    recorded_at,
                );
        }

        self.added.len() + self.updated.len()
    }
}

/// Local state of one tracked dataset, as reported by `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalState {
    Unchanged,
    Modified,
    Missing,
    Ineligible(RejectReason),
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalState::Unchanged => f.write_str("unchanged"),
            LocalState::Modified => f.write_str("modified"),
            LocalState::Missing => f.write_str("missing"),
            LocalState::Ineligible(reason) => write!(f, "ineligible ({})", reason),
        }
    }
}

/// Compares files in the tracked directory with their manifest entries
pub struct DiffEngine {
    manifest_dir: PathBuf,
}

impl DiffEngine {
    /// Create an engine for the directory holding the manifest
    pub fn new(manifest_dir: &Path) -> Result<Self> {
        Ok(Self {
            manifest_dir: manifest_dir.canonicalize()?,
        })
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// Apply the eligibility filter to one candidate.
    ///
    /// Checks run in a fixed order and the first failing one decides the
    /// reason. Relative candidates are taken relative to the manifest
    /// directory.
    pub fn check(&self, candidate: &str) -> std::result::Result<(String, PathBuf), RejectReason> {
        let raw = Path::new(candidate);
        let path = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.manifest_dir.join(raw)
        };

        if !path.exists() {
            return Err(RejectReason::NotFound);
        }
        if path.is_dir() {
            return Err(RejectReason::IsDirectory);
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(RejectReason::NotRegularFile),
        };
        if name.starts_with('.') {
            return Err(RejectReason::Hidden);
        }
        if !path.is_file() {
            return Err(RejectReason::NotRegularFile);
        }
        if name == MANIFEST_FILE_NAME {
            return Err(RejectReason::IsManifest);
        }

        let parent = path
            .canonicalize()
            .ok()
            .and_then(|resolved| resolved.parent().map(Path::to_path_buf));
        if parent.as_deref() != Some(self.manifest_dir.as_path()) {
            return Err(RejectReason::WrongDirectory);
        }

        Ok((name, path))
    }

    /// Classify candidates as added, updated, unchanged or rejected
    pub fn evaluate<S: AsRef<str>>(&self, manifest: &Manifest, candidates: &[S]) -> Result<DiffPlan> {
        let mut plan = DiffPlan::default();
        let mut seen = std::collections::HashSet::new();

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let (name, path) = match self.check(candidate) {
                Ok(found) => found,
                Err(reason) => {
                    log_rejection(candidate, reason);
                    plan.rejected.push(Rejection {
                        path: candidate.to_string(),
                        reason,
                    });
                    continue;
                }
            };

            if !seen.insert(name.clone()) {
                debug!("Ignoring repeated candidate {}", candidate);
                continue;
            }

            let digest = match digest_file(&path) {
                Ok(digest) => digest,
                Err(DssError::SourceNotFound(_)) => {
                    log_rejection(candidate, RejectReason::NotFound);
                    plan.rejected.push(Rejection {
                        path: candidate.to_string(),
                        reason: RejectReason::NotFound,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            match manifest.datasets.get(&name) {
                None => {
                    info!("Adding {} ({})", name, digest.size_human());
                    plan.added.push(Candidate { name, path, digest });
                }
                Some(entry) if entry.digest != digest.digest => {
                    info!("{} has changed, updating", name);
                    plan.updated.push(Candidate { name, path, digest });
                }
                Some(_) => {
                    info!("{} is unchanged", name);
                    plan.unchanged.push(name);
                }
            }
        }

        Ok(plan)
    }

    /// Compare every tracked dataset with the file currently on disk
    pub fn local_states(&self, manifest: &Manifest) -> Result<Vec<(String, LocalState)>> {
        let mut states = Vec::with_capacity(manifest.datasets.len());

        for (name, entry) in &manifest.datasets {
            let state = match self.check(name) {
                Err(RejectReason::NotFound) => LocalState::Missing,
                Err(reason) => LocalState::Ineligible(reason),
                Ok((_, path)) => match digest_file(&path) {
                    Ok(digest) if digest.digest == entry.digest => LocalState::Unchanged,
                    Ok(_) => LocalState::Modified,
                    Err(DssError::SourceNotFound(_)) => LocalState::Missing,
                    Err(e) => return Err(e),
                },
            };
            states.push((name.clone(), state));
        }

        Ok(states)
    }
}

fn log_rejection(candidate: &str, reason: RejectReason) {
    match reason {
        RejectReason::NotFound => warn!("File not found, skipping: {}", candidate),
        RejectReason::WrongDirectory => warn!(
            "File must be in the same directory as {}, skipping: {}",
            MANIFEST_FILE_NAME, candidate
        ),
        other => debug!("Skipping {} ({})", candidate, other),
    }
}
