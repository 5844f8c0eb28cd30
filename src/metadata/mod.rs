//! Fingerprinting and metadata extraction for weight files.
//!
//! This module is the leaf of the catalog: given a file path it computes a
//! cheap identity fingerprint and, where the container allows it, reads the
//! display metadata embedded by the model's author.
//!
//! * [`fingerprint`]: size + mtime identity proxy
//! * [`safetensors`]: the default [`MetadataParser`]
//! * [`naming`]: fallback display names derived from file names
//!
//! Extraction never fails a scan. [`parse_embedded_metadata`] logs every
//! [`ExtractionError`] and hands back an empty [`EmbeddedMetadata`].

pub mod fingerprint;
pub mod naming;
pub mod safetensors;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use fingerprint::generate_fingerprint;
pub use naming::{derive_display_name, NameTable};
pub use safetensors::SafetensorsParser;

/// Metadata an author embedded in a weight file. Every field is optional.
///
/// Fields decode independently: a field holding `null` or a value of the
/// wrong type reads as absent without discarding its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMetadata {
    /// Preferred display name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
    /// Free-form tags, in author order.
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// Longer description.
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Non-string tag entries are dropped.
fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

impl EmbeddedMetadata {
    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.tags.is_empty() && self.description.is_none()
    }

    /// The embedded display name, unless missing or empty.
    #[must_use]
    pub fn usable_display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Why embedded metadata could not be read from a file.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    /// The container format carries no metadata this parser understands.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The header or side-channel entry is absent.
    #[error("Missing field '{field}' in {path}")]
    MissingField {
        /// File being parsed
        path: PathBuf,
        /// Name of the missing entry
        field: String,
    },

    /// The container is structurally invalid.
    #[error("Malformed container {path}: {reason}")]
    Malformed {
        /// File being parsed
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Header or side-channel JSON failed to decode.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File being parsed
        path: PathBuf,
        /// The decode error
        #[source]
        source: serde_json::Error,
    },

    /// The file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being parsed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ExtractionError {
    /// Expected conditions (no metadata present) rather than damaged files.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::MissingField { .. })
    }
}

/// Pluggable reader of embedded metadata.
pub trait MetadataParser: Send + Sync {
    /// Read the metadata embedded in `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] describing why nothing could be read.
    fn parse(&self, path: &Path) -> Result<EmbeddedMetadata, ExtractionError>;
}

/// Run `parser` on `path`, degrading every failure to an empty record.
///
/// Returns the metadata and whether a real (non-absent) failure occurred.
pub fn parse_embedded_metadata(
    parser: &dyn MetadataParser,
    path: &Path,
) -> (EmbeddedMetadata, bool) {
    match parser.parse(path) {
        Ok(metadata) => (metadata, false),
        Err(e) if e.is_absent() => {
            log::debug!("No embedded metadata: {}", e);
            (EmbeddedMetadata::default(), false)
        }
        Err(e) => {
            log::warn!("[Metadata Error] {}", e);
            (EmbeddedMetadata::default(), true)
        }
    }
}
