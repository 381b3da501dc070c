/*!
 * Configuration types for dss
 */

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration, read from `~/.config/dss/config.toml` when present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote id used when `--remote` is not given (`"1"` selects `remote@1`)
    #[serde(default = "default_remote")]
    pub default_remote: String,

    /// ssh executable
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,

    /// rsync executable
    #[serde(default = "default_rsync_program")]
    pub rsync_program: String,

    /// Flags passed to every rsync invocation
    #[serde(default = "default_rsync_flags")]
    pub rsync_flags: Vec<String>,

    /// Extra ssh options (e.g. `["-o", "BatchMode=yes"]`), used for commands and as rsync's transport
    #[serde(default)]
    pub ssh_options: Vec<String>,

    /// Default remote profiles file read by `init` (None = `~/.config/dss/remote`)
    #[serde(default)]
    pub defaults_file: Option<PathBuf>,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_remote: default_remote(),
            ssh_program: default_ssh_program(),
            rsync_program: default_rsync_program(),
            rsync_flags: default_rsync_flags(),
            ssh_options: Vec::new(),
            defaults_file: None,
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn default_remote() -> String {
    "1".to_string()
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

fn default_rsync_program() -> String {
    "rsync".to_string()
}

fn default_rsync_flags() -> Vec<String> {
    vec!["-avz".to_string()]
}

/// `~/.config/dss`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("dss"))
}

impl SyncConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the user's configuration file if it exists, defaults otherwise
    pub fn load_default() -> Result<Self> {
        match config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Location of the default remote profiles file
    pub fn defaults_path(&self) -> Option<PathBuf> {
        self.defaults_file
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join("remote")))
    }
}
