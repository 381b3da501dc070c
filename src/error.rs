/*!
 * Error types for dss
 *
 * Every variant here is a structural failure: it aborts the whole command
 * before the manifest is modified. Per-file problems during push and pull are
 * not errors; they are recorded as outcomes in the run report.
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DssError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug)]
pub enum DssError {
    /// File to hash does not exist
    SourceNotFound(PathBuf),

    /// No manifest in the tracked directory
    ManifestNotFound(PathBuf),

    /// `init` refused to overwrite an existing manifest
    ManifestExists(PathBuf),

    /// Manifest could not be read, parsed or written
    Manifest(dss_core_manifest::Error),

    /// Manifest has no identifier and the command cannot create one
    MissingManifestId,

    /// No `remote@<id>` profile in the manifest
    RemoteNotConfigured(String),

    /// Profile exists but lacks a required field
    RemoteIncomplete { remote: String, field: String },

    /// Profile has no local staging path (needed by mirror)
    NoStagingPath(String),

    /// `add` found nothing it could track
    NoEligibleFiles,

    /// Manifest tracks no datasets
    NoDatasets,

    /// None of the requested names are tracked
    NoFilesSelected,

    /// A single remote command (list, mirror) failed
    Remote { operation: String, stderr: String },

    /// Configuration error
    Config(String),

    /// I/O error
    Io(io::Error),
}

impl DssError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }

    /// Short hint shown under the error message
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            DssError::ManifestNotFound(_) => Some("Run 'dss init' first."),
            DssError::RemoteNotConfigured(_) | DssError::RemoteIncomplete { .. } => {
                Some("Add the profile to manifest.yml or to ~/.config/dss/remote before 'dss init'.")
            }
            DssError::MissingManifestId => Some("Run 'dss add' or 'dss push' to assign one."),
            DssError::NoStagingPath(_) => Some("Re-run 'dss init --ref-path <dir>' or set local_ref_path."),
            _ => None,
        }
    }
}

impl fmt::Display for DssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DssError::SourceNotFound(path) => {
                write!(f, "File not found: {}", path.display())
            }
            DssError::ManifestNotFound(path) => {
                write!(f, "No manifest found at {}", path.display())
            }
            DssError::ManifestExists(path) => {
                write!(f, "Manifest file already exists: {}", path.display())
            }
            DssError::Manifest(err) => write!(f, "{}", err),
            DssError::MissingManifestId => {
                write!(f, "No manifest identifier found in manifest")
            }
            DssError::RemoteNotConfigured(key) => {
                write!(f, "No {} configuration found in manifest", key)
            }
            DssError::RemoteIncomplete { remote, field } => {
                write!(
                    f,
                    "Missing required remote configuration for {}: {}",
                    remote, field
                )
            }
            DssError::NoStagingPath(key) => {
                write!(f, "{} has no local_ref_path to mirror", key)
            }
            DssError::NoEligibleFiles => write!(f, "No valid files found to add"),
            DssError::NoDatasets => write!(f, "No datasets found in manifest"),
            DssError::NoFilesSelected => write!(f, "None of the requested files are tracked"),
            DssError::Remote { operation, stderr } => {
                write!(f, "Remote {} failed: {}", operation, stderr.trim_end())
            }
            DssError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DssError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for DssError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DssError::Io(err) => Some(err),
            DssError::Manifest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DssError {
    fn from(err: io::Error) -> Self {
        DssError::Io(err)
    }
}

impl From<dss_core_manifest::Error> for DssError {
    fn from(err: dss_core_manifest::Error) -> Self {
        use dss_core_manifest::Error as ManifestError;
        match err {
            ManifestError::NotFound { path } => DssError::ManifestNotFound(path),
            ManifestError::MissingField { remote, field } => {
                DssError::RemoteIncomplete { remote, field }
            }
            other => DssError::Manifest(other),
        }
    }
}

impl From<toml::de::Error> for DssError {
    fn from(err: toml::de::Error) -> Self {
        DssError::Config(format!("TOML parse error: {}", err))
    }
}
