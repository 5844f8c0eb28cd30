//! Fingerprint-keyed catalog of weight files.
//!
//! This module owns the persisted mapping from file path to
//! [`CatalogRecord`] and keeps it consistent with the filesystem.
//!
//! # Architecture
//!
//! * [`record`]: the record type and the catalog map.
//! * [`store`]: JSON snapshot load/persist.
//! * [`manager`]: the scan that reconciles the snapshot with a live walk.
//!
//! # Cache Invalidation
//!
//! A record is reused only when its path is still present and the file's
//! size + mtime fingerprint is unchanged. Anything else rebuilds the record
//! with fresh metadata and a new `add_time`. Files that disappeared are
//! dropped. The snapshot is rewritten only when the scan actually changed
//! something.

pub mod manager;
pub mod record;
pub mod store;

use std::path::PathBuf;

pub use manager::{CatalogManager, ManagerConfig, ScanSummary};
pub use record::{sorted_by_add_time, Catalog, CatalogRecord};
pub use store::{CatalogStore, DEFAULT_CACHE_FILE};

/// Errors raised by the catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The catalog root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The persisted snapshot does not decode.
    #[error("Corrupt catalog snapshot {path}: {source}")]
    Corrupt {
        /// Snapshot file
        path: PathBuf,
        /// The decode error
        #[source]
        source: serde_json::Error,
    },

    /// The catalog could not be encoded.
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An I/O error occurred on the catalog directory or snapshot.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
