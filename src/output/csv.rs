//! CSV output formatter for catalog listings.
//!
//! One row per record.
//!
//! # Columns
//!
//! - `internal_name`: Selector value
//! - `display_name`: Human-readable name
//! - `tags`: Tags joined with `;`
//! - `description`: Free text from embedded metadata
//! - `add_time`: When the record was (re)built (RFC 3339)
//! - `path`: Absolute path to the weight file

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogRecord;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    internal_name: &'a str,
    display_name: &'a str,
    tags: String,
    description: &'a str,
    add_time: String,
    path: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: &'a [CatalogRecord],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(records: &'a [CatalogRecord]) -> Self {
        Self { records }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for record in self.records {
            csv_writer.serialize(CsvRow {
                internal_name: &record.internal_name,
                display_name: &record.display_name,
                tags: record.tags.join(";"),
                description: &record.description,
                add_time: record.add_time.to_rfc3339(),
                path: record.path.to_string_lossy().into_owned(),
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
