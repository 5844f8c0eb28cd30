//! Plain-text output for terminals.

use std::io::{self, Write};

use crate::catalog::{CatalogRecord, ScanSummary};

/// Human-readable listing of records.
pub struct TextOutput<'a> {
    records: &'a [CatalogRecord],
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(records: &'a [CatalogRecord]) -> Self {
        Self { records }
    }

    /// One line per record: internal name, display name and tags.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let width = self
            .records
            .iter()
            .map(|r| r.internal_name.chars().count())
            .max()
            .unwrap_or(0);

        for record in self.records {
            write!(
                writer,
                "{:<width$}  {}",
                record.internal_name,
                record.display_name,
                width = width
            )?;
            if !record.tags.is_empty() {
                write!(writer, "  [{}]", record.tags.join(", "))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// All fields of a single record, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_detail<W: Write>(record: &CatalogRecord, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Name:         {}", record.internal_name)?;
        writeln!(writer, "Display name: {}", record.display_name)?;
        writeln!(writer, "Path:         {}", record.path.display())?;
        writeln!(writer, "Added:        {}", record.add_time.to_rfc3339())?;
        writeln!(writer, "Fingerprint:  {}", record.fingerprint)?;
        if !record.tags.is_empty() {
            writeln!(writer, "Tags:         {}", record.tags.join(", "))?;
        }
        if !record.description.is_empty() {
            writeln!(writer, "Description:  {}", record.description)?;
        }
        Ok(())
    }
}

/// One-line scan summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(summary: &ScanSummary, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{} models ({} reused, {} rebuilt, {} dropped) in {:.2?}{}",
        summary.total_files,
        summary.reused,
        summary.rebuilt,
        summary.dropped,
        summary.scan_duration,
        if summary.persisted {
            ", catalog saved"
        } else {
            ""
        }
    )?;
    if summary.extraction_failures > 0 {
        writeln!(
            writer,
            "{} files had unreadable metadata; fallback names used",
            summary.extraction_failures
        )?;
    }
    if summary.walk_errors > 0 {
        writeln!(writer, "{} entries could not be read", summary.walk_errors)?;
    }
    Ok(())
}
