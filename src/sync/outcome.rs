/*!
 * Structured results of add, push, pull and status runs
 *
 * These are plain data. Rendering (styled tables, JSON) happens in the
 * command layer after the run is over.
 */

use crate::core::diff::{LocalState, Rejection};
use crate::remote::Direction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// What happened to one dataset during push or pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Copied to the remote
    Pushed,
    /// Copied from the remote and the digest matches the manifest
    Verified,
    /// Copied from the remote but the digest differs from the manifest
    IntegrityMismatch,
    /// Not present in the tracked directory
    LocalMissing,
    /// Remote directory could not be created
    RemoteDirFailed,
    /// The copy exited unsuccessfully
    TransferFailed,
    /// Not present on the remote
    RemoteMissing,
    /// The remote existence probe failed
    RemoteCheckFailed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Pushed => "pushed",
            OutcomeKind::Verified => "verified",
            OutcomeKind::IntegrityMismatch => "integrity_mismatch",
            OutcomeKind::LocalMissing => "local_missing",
            OutcomeKind::RemoteDirFailed => "remote_dir_failed",
            OutcomeKind::TransferFailed => "transfer_failed",
            OutcomeKind::RemoteMissing => "remote_missing",
            OutcomeKind::RemoteCheckFailed => "remote_check_failed",
        }
    }

    /// Bytes were copied and the remote path was recorded
    pub fn is_transferred(&self) -> bool {
        matches!(
            self,
            OutcomeKind::Pushed | OutcomeKind::Verified | OutcomeKind::IntegrityMismatch
        )
    }

    /// The file was not present on one side
    pub fn is_missing(&self) -> bool {
        matches!(self, OutcomeKind::LocalMissing | OutcomeKind::RemoteMissing)
    }

    /// A remote operation failed
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            OutcomeKind::RemoteDirFailed
                | OutcomeKind::TransferFailed
                | OutcomeKind::RemoteCheckFailed
        )
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final decision for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub name: String,
    pub kind: OutcomeKind,
    /// Remote stderr, mismatch digests or other diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Relative path recorded in the manifest, for transferred files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

impl FileOutcome {
    pub fn new(name: impl Into<String>, kind: OutcomeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            detail: None,
            remote_path: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_remote_path(mut self, path: impl Into<String>) -> Self {
        self.remote_path = Some(path.into());
        self
    }
}

/// Counts over the outcomes of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub transferred: usize,
    pub verified: usize,
    pub integrity_mismatch: usize,
    pub missing: usize,
    pub failed: usize,
}

impl SyncSummary {
    /// Every file was pushed, or pulled with a matching digest
    pub fn all_succeeded(&self) -> bool {
        self.transferred - self.integrity_mismatch == self.total
    }
}

/// Everything a push or pull run decided
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub direction: Direction,
    /// Profile key (`remote@<id>`)
    pub remote: String,
    pub manifest_id: String,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<FileOutcome>,
    /// Requested names that are not tracked
    pub warnings: Vec<String>,
    /// A manifest identifier was generated during this run
    pub id_generated: bool,
    /// The manifest was written back
    pub saved: bool,
}

impl SyncReport {
    pub fn new(direction: Direction, remote: impl Into<String>, manifest_id: impl Into<String>) -> Self {
        Self {
            direction,
            remote: remote.into(),
            manifest_id: manifest_id.into(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
            warnings: Vec::new(),
            id_generated: false,
            saved: false,
        }
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            let kind = outcome.kind;
            if kind.is_transferred() {
                summary.transferred += 1;
            }
            if kind == OutcomeKind::Verified {
                summary.verified += 1;
            }
            if kind == OutcomeKind::IntegrityMismatch {
                summary.integrity_mismatch += 1;
            }
            if kind.is_missing() {
                summary.missing += 1;
            }
            if kind.is_failure() {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Outcomes of one kind, in processing order
    pub fn of_kind(&self, kind: OutcomeKind) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(move |o| o.kind == kind)
    }
}

/// Result of `add`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub rejected: Vec<Rejection>,
    pub id_generated: bool,
    pub saved: bool,
}

/// One row of `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStatus {
    pub name: String,
    pub state: LocalState,
    pub size_human: String,
    /// Remote keys with a recorded path
    pub remotes: Vec<String>,
}

/// Result of `status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub manifest_id: Option<String>,
    pub datasets: Vec<DatasetStatus>,
    /// Profile keys configured in the manifest
    pub remotes: Vec<String>,
}
