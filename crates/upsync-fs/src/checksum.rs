//! Content digests
//!
//! Every hash the engine compares or persists is spelled `sha256:<hex>`, so
//! a baseline written by one run compares equal to hashes computed by the
//! next.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

const PREFIX: &str = "sha256:";

fn render(hasher: Sha256) -> String {
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Digest of in-memory bytes.
pub fn compute_content_checksum(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    render(hasher)
}

/// Digest of a file, streamed rather than read whole.
///
/// # Errors
///
/// Fails if the file cannot be opened or read; the diff engine turns this
/// into a per-file error.
pub fn compute_file_checksum(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(render(hasher))
}
