use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "license-builder",
    about = "Collect third-party license attributions and merge duplicates",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log progress details (same as LICENSE_BUILDER_LOG=info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// No progress output on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract third-party SPDX copyright headers from source files
    Extract(ScanArgs),
    /// Collect LICENSE files from projects and their dependencies
    Copy(ScanArgs),
    /// Run extract and copy together into one report
    All(ScanArgs),
}

impl Command {
    pub fn args(&self) -> &ScanArgs {
        match self {
            Command::Extract(args) | Command::Copy(args) | Command::All(args) => args,
        }
    }

    pub fn scans_headers(&self) -> bool {
        matches!(self, Command::Extract(_) | Command::All(_))
    }

    pub fn scans_license_files(&self) -> bool {
        matches!(self, Command::Copy(_) | Command::All(_))
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Project root directories to scan
    #[arg(required = true, value_name = "PROJECT_PATH")]
    pub paths: Vec<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: ReportFormat,

    /// Do not look up full license texts for SPDX identifiers
    #[arg(long)]
    pub no_licenses: bool,

    /// Only use locally cached license texts
    #[arg(long)]
    pub offline: bool,

    /// Keep separate entries for umbrella projects sharing a license
    #[arg(long)]
    pub no_deduplicate_rapids: bool,

    /// Keep CCCL component licenses even when the CCCL root license is present
    #[arg(long)]
    pub no_handle_cccl: bool,

    /// Treat license texts differing only in copyright years as distinct
    #[arg(long)]
    pub no_normalize_years: bool,

    /// Config file [default: <first project>/.license-builder/config.toml, fallback ~/.config/license-builder/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Summary,
}
