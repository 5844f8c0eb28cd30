//! loracat - fingerprint-keyed metadata catalog for LoRA weight files.
//!
//! Scans a directory of weight files, keeps a persistent snapshot of
//! per-file records (display name, tags, description, add time) keyed by
//! path and validated by a size + mtime fingerprint, and resolves a
//! selector to a file for an external loader.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod scanner;
pub mod selection;

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::catalog::{CatalogManager, CatalogRecord, ScanSummary};
use crate::cli::{Cli, Commands, ConfigArgs, OutputFormat, ResolveArgs, ShowArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::selection::{LoadRequest, ProbeLoader, SelectError};

/// Run the command described by `cli`.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Returns an error if the command fails. [`ExitCode::for_error`] maps it
/// to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(dir) = cli.dir {
        config.catalog_dir = dir;
    }
    log::debug!("Effective configuration: {:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Scan(args) => {
            let mut manager = open_manager(&config)?;
            let (records, summary) = manager.scan_with_summary(args.force)?;
            write_records(&records, Some(&summary), args.output, &mut out)?;
        }
        Commands::List(args) => {
            let mut manager = open_manager(&config)?;
            let records = manager.scan(false)?;
            let records: Vec<CatalogRecord> = match &args.search {
                Some(keyword) => selection::search(&records, keyword)
                    .into_iter()
                    .cloned()
                    .collect(),
                None => records,
            };
            write_records(&records, None, args.output, &mut out)?;
        }
        Commands::Show(args) => {
            let mut manager = open_manager(&config)?;
            run_show(&mut manager, &args, &mut out)?;
        }
        Commands::Choices => {
            let mut manager = open_manager(&config)?;
            for choice in selection::choices(&manager.scan(false)?) {
                writeln!(out, "{}", choice)?;
            }
        }
        Commands::Resolve(args) => {
            let mut manager = open_manager(&config)?;
            run_resolve(&mut manager, &args, &mut out)?;
        }
        Commands::Token(args) => {
            let token = LoadRequest::new(args.name, args.strength)
                .change_token()
                .context("Failed to compute change token")?;
            writeln!(out, "{}", token)?;
        }
        Commands::ClearCache => {
            let mut manager = open_manager(&config)?;
            manager.clear()?;
            log::info!("Removed {}", manager.cache_path().display());
        }
        Commands::Config(args) => run_config(&config, cli.config.as_deref(), &args, &mut out)?,
    }

    Ok(ExitCode::Success)
}

fn open_manager(config: &Config) -> Result<CatalogManager> {
    CatalogManager::with_config(&config.catalog_dir, config.manager_config()).with_context(|| {
        format!(
            "Failed to open catalog directory {}",
            config.catalog_dir.display()
        )
    })
}

fn run_show<W: Write>(manager: &mut CatalogManager, args: &ShowArgs, out: &mut W) -> Result<()> {
    manager.scan(false)?;
    let record = manager
        .find_by_internal_name(&args.name)
        .ok_or_else(|| SelectError::NotFound {
            name: args.name.clone(),
        })?;

    match args.output {
        OutputFormat::Text => TextOutput::write_detail(record, out)?,
        OutputFormat::Json => JsonOutput::new([record]).write_to(out, true)?,
        OutputFormat::Csv => CsvOutput::new(std::slice::from_ref(record)).write_to(out)?,
    }
    Ok(())
}

fn run_resolve<W: Write>(
    manager: &mut CatalogManager,
    args: &ResolveArgs,
    out: &mut W,
) -> Result<()> {
    let pair = selection::resolve_and_apply(
        manager,
        &ProbeLoader,
        ProbeLoader::base(),
        &args.name,
        args.strength,
    )?;

    match pair.model {
        Some(report) => {
            write!(
                out,
                "{} (strength {}, {} bytes",
                report.path.display(),
                report.strength_model,
                report.size
            )?;
            if let Some(tensors) = report.tensors {
                write!(out, ", {} tensors", tensors)?;
            }
            writeln!(out, ")")?;
        }
        None => writeln!(out, "passthrough: base model unchanged")?,
    }
    Ok(())
}

fn run_config<W: Write>(
    config: &Config,
    explicit_path: Option<&std::path::Path>,
    args: &ConfigArgs,
    out: &mut W,
) -> Result<()> {
    write!(out, "{}", config.to_toml()?)?;
    if args.save {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Config::config_path()?,
        };
        config.save_to(&path)?;
        log::info!("Saved configuration to {}", path.display());
    }
    Ok(())
}

fn write_records<W: Write>(
    records: &[CatalogRecord],
    summary: Option<&ScanSummary>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            TextOutput::new(records).write_to(out)?;
            if let Some(summary) = summary {
                output::text::write_summary(summary, out)?;
            }
        }
        OutputFormat::Json => {
            let mut output = JsonOutput::new(records);
            if let Some(summary) = summary {
                output = output.with_summary(summary, ExitCode::Success);
            }
            output.write_to(out, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(records).write_to(out)?,
    }
    Ok(())
}
