//! Cheap file identity fingerprints.
//!
//! A fingerprint is the file size and modification time rendered as one
//! string (`"{size}-{secs}.{nanos}"`). Computing it costs a single `stat`
//! call, never a content read. Two different files with identical size and
//! mtime collide; the catalog accepts that in exchange for scan speed.

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Compute the fingerprint of the file at `path`.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be stat-ed.
pub fn generate_fingerprint(path: &Path) -> io::Result<String> {
    let metadata = std::fs::metadata(path)?;
    Ok(fingerprint_from_metadata(&metadata))
}

/// Fingerprint from already fetched metadata.
#[must_use]
pub fn fingerprint_from_metadata(metadata: &Metadata) -> String {
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    format_fingerprint(metadata.len(), modified)
}

fn format_fingerprint(size: u64, modified: SystemTime) -> String {
    // Pre-epoch mtimes are rare enough to fold into a signed seconds field.
    match modified.duration_since(UNIX_EPOCH) {
        Ok(since) => format!("{}-{}.{:09}", size, since.as_secs(), since.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            format!("{}--{}.{:09}", size, before.as_secs(), before.subsec_nanos())
        }
    }
}
