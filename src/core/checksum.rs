/*!
 * Streaming SHA-256 digests and human-readable sizes for tracked files
 */

use crate::error::{DssError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

const SIZE_UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];

/// Streaming hasher that calculates a digest incrementally
pub struct StreamingHasher {
    hasher: Sha256,
    bytes: u64,
}

impl StreamingHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.bytes += data.len() as u64;
    }

    /// Bytes fed so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Finalize into a lowercase hex digest
    pub fn finalize_hex(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest and byte count of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub digest: String,
    pub size_bytes: u64,
}

impl FileDigest {
    pub fn size_human(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Hash a file in fixed-size chunks.
///
/// A path that does not exist when the file is opened yields
/// [`DssError::SourceNotFound`]; any other failure, including one part way
/// through the read, is an I/O error.
pub fn digest_file(path: &Path) -> Result<FileDigest> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DssError::SourceNotFound(path.to_path_buf()),
        _ => DssError::Io(e),
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = StreamingHasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let size_bytes = hasher.bytes();
    Ok(FileDigest {
        digest: hasher.finalize_hex(),
        size_bytes,
    })
}

/// Calculate the hex digest of a file
pub fn calculate_checksum(path: &Path) -> Result<String> {
    Ok(digest_file(path)?.digest)
}

/// Format a byte count with base-1024 units.
///
/// Bytes render as an integer (`"512B"`), every larger unit with one decimal
/// (`"1.5M"`). Values beyond the petabyte range stay in `P`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1}{}", value, SIZE_UNITS[unit])
    }
}
