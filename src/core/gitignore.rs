/*!
 * Keep local staging directories out of version control
 */

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Make sure `entry` is listed in `<workdir>/.gitignore`.
///
/// Creates the file when absent. Lines are compared after trimming
/// whitespace. Returns `true` when the file was written.
pub fn ensure_gitignore(workdir: &Path, entry: &str) -> Result<bool> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(false);
    }

    let path = workdir.join(GITIGNORE_FILE_NAME);

    if !path.exists() {
        fs::write(&path, format!("{}\n", entry))?;
        info!("Created {} with {}", GITIGNORE_FILE_NAME, entry);
        return Ok(true);
    }

    let contents = fs::read_to_string(&path)?;
    if contents.lines().any(|line| line.trim() == entry) {
        debug!("{} already ignores {}", GITIGNORE_FILE_NAME, entry);
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(&path)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", entry)?;
    info!("Added {} to {}", entry, GITIGNORE_FILE_NAME);
    Ok(true)
}
