/*!
 * Local file handling: digests, change detection and ignore-file upkeep
 */

pub mod checksum;
pub mod diff;
pub mod gitignore;

pub use checksum::{calculate_checksum, digest_file, format_size, FileDigest};
pub use diff::{DiffEngine, DiffPlan, LocalState, RejectReason, Rejection};
pub use gitignore::ensure_gitignore;
