//! JSON output formatter for catalog listings.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "models": [
//!     {
//!       "internal_name": "portrait_v1",
//!       "display_name": "肖像版本1",
//!       "tags": ["style"],
//!       "description": "",
//!       "add_time": "2024-05-01T12:00:00Z",
//!       "fingerprint": "1024-1714564800.000000000",
//!       "path": "/srv/lora_models/portrait_v1.safetensors"
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 1,
//!     "reused": 0,
//!     "rebuilt": 1,
//!     "dropped": 0,
//!     "extraction_failures": 0,
//!     "walk_errors": 0,
//!     "persisted": true,
//!     "scan_duration_ms": 3,
//!     "exit_code": 0,
//!     "exit_code_name": "LC000"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{CatalogRecord, ScanSummary};
use crate::error::ExitCode;

/// A single catalog record in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// Selector value
    pub internal_name: String,
    /// Human-readable name
    pub display_name: String,
    /// Tags from embedded metadata
    pub tags: Vec<String>,
    /// Description from embedded metadata
    pub description: String,
    /// When the record was (re)built
    pub add_time: DateTime<Utc>,
    /// Size + mtime fingerprint
    pub fingerprint: String,
    /// Absolute path of the weight file
    pub path: String,
}

impl From<&CatalogRecord> for JsonRecord {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            internal_name: record.internal_name.clone(),
            display_name: record.display_name.clone(),
            tags: record.tags.clone(),
            description: record.description.clone(),
            add_time: record.add_time,
            fingerprint: record.fingerprint.clone(),
            path: record.path.to_string_lossy().into_owned(),
        }
    }
}

/// Scan statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Weight files seen by the walk
    pub total_files: usize,
    /// Records carried over unchanged
    pub reused: usize,
    /// Records built from scratch
    pub rebuilt: usize,
    /// Records whose file disappeared
    pub dropped: usize,
    /// Files whose embedded metadata failed to parse
    pub extraction_failures: usize,
    /// Entries the walk could not read
    pub walk_errors: usize,
    /// Whether the snapshot was rewritten
    pub persisted: bool,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "LC000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a scan summary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            reused: summary.reused,
            rebuilt: summary.rebuilt,
            dropped: summary.dropped,
            extraction_failures: summary.extraction_failures,
            walk_errors: summary.walk_errors,
            persisted: summary.persisted,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Records, newest first
    pub models: Vec<JsonRecord>,
    /// Scan statistics, absent for listings that did not scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JsonSummary>,
}

impl JsonOutput {
    /// Output for a set of records without scan statistics.
    #[must_use]
    pub fn new<'a>(records: impl IntoIterator<Item = &'a CatalogRecord>) -> Self {
        Self {
            models: records.into_iter().map(JsonRecord::from).collect(),
            summary: None,
        }
    }

    /// Attach scan statistics.
    #[must_use]
    pub fn with_summary(mut self, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        self.summary = Some(JsonSummary::from_scan_summary(summary, exit_code));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
