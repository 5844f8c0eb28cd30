//! Command-line interface definitions for loracat.
//!
//! Global options (verbosity, config file, catalog directory) come first,
//! then a subcommand per catalog operation.
//!
//! # Example
//!
//! ```bash
//! # Refresh the catalog and list it
//! loracat scan
//!
//! # Rebuild every record, JSON output for scripting
//! loracat scan --force --output json
//!
//! # Filter by display name or tag
//! loracat list --search portrait
//!
//! # Check what a selector would load
//! loracat resolve portrait_v1 --strength 0.8
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::selection::{STRENGTH_DEFAULT, STRENGTH_MAX, STRENGTH_MIN};

/// Fingerprint-cached catalog of LoRA weight files.
#[derive(Debug, Parser)]
#[command(name = "loracat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Catalog directory, overriding the configured one
    #[arg(short, long, value_name = "DIR", global = true, env = "LORACAT_CATALOG_DIR")]
    pub dir: Option<PathBuf>,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile the catalog with the directory and list it
    Scan(ScanArgs),
    /// List catalog records, optionally filtered
    List(ListArgs),
    /// Show every field of one record
    Show(ShowArgs),
    /// Print the selector choices a host would offer
    Choices,
    /// Resolve a selector and validate the file it points to
    Resolve(ResolveArgs),
    /// Print the change token of a load request
    Token(TokenArgs),
    /// Delete the catalog snapshot
    ClearCache,
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Rebuild every record, ignoring fingerprints
    #[arg(short, long)]
    pub force: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the list subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Keep records whose display name or tags contain KEYWORD
    #[arg(short, long, value_name = "KEYWORD")]
    pub search: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the show subcommand.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Internal name of the record
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the resolve subcommand.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Internal name, or "None"
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Strength applied to both halves (0.0 to 2.0)
    #[arg(short, long, default_value_t = STRENGTH_DEFAULT, value_parser = parse_strength)]
    pub strength: f64,
}

/// Arguments for the token subcommand.
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Internal name, or "None"
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Strength applied to both halves (0.0 to 2.0)
    #[arg(short, long, default_value_t = STRENGTH_DEFAULT, value_parser = parse_strength)]
    pub strength: f64,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Also write the effective configuration to the config file
    #[arg(long)]
    pub save: bool,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a strength value and check it lies in the accepted range.
///
/// ```
/// use loracat::cli::parse_strength;
///
/// assert_eq!(parse_strength("0.8").unwrap(), 0.8);
/// assert!(parse_strength("2.5").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the string is not a finite number in
/// `STRENGTH_MIN..=STRENGTH_MAX`.
pub fn parse_strength(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{}'", s.trim()))?;

    if !value.is_finite() || !(STRENGTH_MIN..=STRENGTH_MAX).contains(&value) {
        return Err(format!(
            "Strength must be between {STRENGTH_MIN} and {STRENGTH_MAX}, got {value}"
        ));
    }
    Ok(value)
}
