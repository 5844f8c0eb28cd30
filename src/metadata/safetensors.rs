//! Embedded metadata reader for `.safetensors` files.
//!
//! A safetensors file starts with a little-endian `u64` header length
//! followed by a JSON object of that many bytes. The optional
//! `__metadata__` entry of that object is a string-to-string map; catalog
//! metadata lives in it under a side-channel key (`ssmd` by default) as a
//! JSON-encoded string. Only the header is read, never the tensor data.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};

use super::{EmbeddedMetadata, ExtractionError, MetadataParser};
use crate::scanner::WeightFormat;

/// Side-channel key used when none is configured.
pub const DEFAULT_METADATA_KEY: &str = "ssmd";

/// Headers larger than this are rejected as malformed.
pub const MAX_HEADER_SIZE: u64 = 100_000_000;

const METADATA_ENTRY: &str = "__metadata__";

/// [`MetadataParser`] for safetensors containers.
#[derive(Debug, Clone)]
pub struct SafetensorsParser {
    key: String,
}

impl Default for SafetensorsParser {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_KEY)
    }
}

impl SafetensorsParser {
    /// Create a parser reading the given side-channel key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The side-channel key this parser reads.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl MetadataParser for SafetensorsParser {
    fn parse(&self, path: &Path) -> Result<EmbeddedMetadata, ExtractionError> {
        match WeightFormat::from_path(path) {
            Some(WeightFormat::SafeTensors) => {}
            _ => return Err(ExtractionError::UnsupportedFormat(path.to_path_buf())),
        }

        let header = read_header(path)?;
        let metadata = header
            .get(METADATA_ENTRY)
            .and_then(Value::as_object)
            .ok_or_else(|| ExtractionError::MissingField {
                path: path.to_path_buf(),
                field: METADATA_ENTRY.to_string(),
            })?;

        let raw = metadata
            .get(&self.key)
            .ok_or_else(|| ExtractionError::MissingField {
                path: path.to_path_buf(),
                field: self.key.clone(),
            })?
            .as_str()
            .ok_or_else(|| ExtractionError::Malformed {
                path: path.to_path_buf(),
                reason: format!("'{}' is not a string", self.key),
            })?;

        serde_json::from_str(raw).map_err(|source| ExtractionError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Names of the tensors declared in a safetensors header, sorted.
///
/// # Errors
///
/// Returns an error if the header cannot be read or decoded.
pub fn tensor_names(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let header = read_header(path)?;
    let mut names: Vec<String> = header
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| name != METADATA_ENTRY)
        .collect();
    names.sort();
    Ok(names)
}

/// Read and decode the JSON header of a safetensors file.
fn read_header(path: &Path) -> Result<Map<String, Value>, ExtractionError> {
    let io_err = |source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes).map_err(io_err)?;
    let len = u64::from_le_bytes(len_bytes);
    if len == 0 || len > MAX_HEADER_SIZE {
        return Err(ExtractionError::Malformed {
            path: path.to_path_buf(),
            reason: format!("header length {} out of range", len),
        });
    }

    let mut header = Vec::new();
    reader.take(len).read_to_end(&mut header).map_err(io_err)?;
    if header.len() as u64 != len {
        return Err(ExtractionError::Malformed {
            path: path.to_path_buf(),
            reason: format!("header truncated at {} of {} bytes", header.len(), len),
        });
    }

    serde_json::from_slice(&header).map_err(|source| ExtractionError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a minimal safetensors file carrying only a `__metadata__` map.
///
/// Used by tests and benchmarks to produce realistic fixtures.
#[must_use]
pub fn encode_metadata_only(metadata: &Map<String, Value>) -> Vec<u8> {
    let mut header = Map::new();
    header.insert(METADATA_ENTRY.to_string(), Value::Object(metadata.clone()));
    let json = Value::Object(header).to_string();

    let mut bytes = Vec::with_capacity(8 + json.len());
    bytes.extend_from_slice(&(json.len() as u64).to_le_bytes());
    bytes.extend_from_slice(json.as_bytes());
    bytes
}
