/*!
 * dss - dataset sync
 *
 * Track data files in a `manifest.yml` next to them and move them to and from
 * remote hosts over ssh/rsync:
 * - SHA-256 change detection with idempotent re-adds
 * - Remote paths namespaced by a per-manifest identifier
 * - Per-file push/pull outcomes; one bad file never blocks the rest
 * - Pull-time integrity verification against recorded digests
 * - Legacy manifests load, round-trip and gain an identifier on first write
 */

pub mod cli_style;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use config::{LogLevel, SyncConfig};
pub use error::{DssError, Result};
pub use remote::{Direction, RemoteCopy, RemoteShell, RemoteTransport};
pub use sync::{Orchestrator, SyncReport, Workspace};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
