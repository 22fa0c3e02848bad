//! `license-builder` — collect third-party license attributions and merge duplicates.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config and apply `--no-*` overrides ([`load_config`]).
//! 3. Scan every project for SPDX headers and/or LICENSE files ([`Scanner`]).
//! 4. Resolve license texts for identifier-only records ([`registry`]).
//! 5. Group equivalent records ([`engine::group`]).
//! 6. Render the requested report ([`report`]).

mod cli;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, ReportFormat, ScanArgs};
use license_builder::config::load_config;
use license_builder::engine::{self, GroupingOptions};
use license_builder::models::Record;
use license_builder::registry::{self, LicenseTextResolver};
use license_builder::report;
use license_builder::scanner::license_files::LicenseFileScanner;
use license_builder::scanner::spdx::SpdxScanner;
use license_builder::scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = cli.command.args();
    let paths = validate_paths(&args.paths)?;

    // Load config from the first project
    let mut config = load_config(&paths[0], args.config.as_deref())?;
    apply_overrides(&mut config.grouping, args);

    if !cli.quiet {
        let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        eprintln!("{} {}", "Project path(s):".bold(), joined.join(", "));
    }

    let mut records: Vec<Record> = Vec::new();

    if cli.command.scans_headers() {
        let spdx = SpdxScanner::new(config.scan.exclude_dirs.clone(), config.scan.first_party.clone());
        records.extend(scan_all(&spdx, &paths, "SPDX header", cli.quiet)?);
    }

    if cli.command.scans_license_files() {
        let files = LicenseFileScanner::new(config.scan.exclude_dirs.clone());
        records.extend(scan_all(&files, &paths, "license file", cli.quiet)?);
    }

    if !args.no_licenses {
        let resolver = LicenseTextResolver::new(config.licenses.resolved_cache_dir(), args.offline)?;
        let filled = registry::fill_license_texts(&mut records, &resolver, cli.quiet).await?;
        info!(filled, "license texts resolved");
    }

    let outcome = engine::group(&records, &config.grouping, &config.reference);

    match args.format {
        ReportFormat::Text => write_output(args.output.as_deref(), |out| {
            report::text::write_report(out, &outcome.groups)?;
            Ok(())
        })?,
        ReportFormat::Json => write_output(args.output.as_deref(), |out| {
            serde_json::to_writer_pretty(&mut *out, &outcome.groups)?;
            writeln!(out)?;
            Ok(())
        })?,
        ReportFormat::Summary => {
            report::terminal::render(&outcome, &paths, cli.verbose, cli.quiet)?;
        }
    }

    if !cli.quiet && args.format != ReportFormat::Summary {
        eprintln!(
            "  {} {} groups from {} records ({} suppressed, {} merged, {} rejected)",
            "→".cyan(),
            outcome.stats.groups,
            outcome.stats.input,
            outcome.stats.suppressed,
            outcome.stats.umbrella_merged,
            outcome.stats.rejected,
        );
        if let Some(output) = &args.output {
            eprintln!("  {} wrote {}", "✓".green(), output.display());
        }
    }

    Ok(())
}

/// `LICENSE_BUILDER_LOG` takes an `EnvFilter` directive; without it only
/// warnings are shown, or info with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("LICENSE_BUILDER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn validate_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut validated = Vec::with_capacity(paths.len());
    for path in paths {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
        if !absolute.exists() {
            bail!("project path '{}' does not exist", absolute.display());
        }
        if !absolute.is_dir() {
            bail!("project path '{}' is not a directory", absolute.display());
        }
        validated.push(absolute);
    }
    Ok(validated)
}

fn apply_overrides(options: &mut GroupingOptions, args: &ScanArgs) {
    if args.no_deduplicate_rapids {
        options.deduplicate_rapids = false;
    }
    if args.no_handle_cccl {
        options.handle_cccl = false;
    }
    if args.no_normalize_years {
        options.normalize_years = false;
    }
}

fn scan_all(scanner: &dyn Scanner, paths: &[PathBuf], what: &str, quiet: bool) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for path in paths {
        let found = scanner
            .scan(path)
            .with_context(|| format!("scanning {}", path.display()))?;
        if !quiet {
            eprintln!(
                "  {} {} {} record(s) in {}",
                "→".cyan(),
                found.len(),
                what,
                path.display()
            );
        }
        records.extend(found);
    }
    Ok(records)
}

fn write_output<F>(output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
