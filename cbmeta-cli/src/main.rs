//! cbmeta CLI - reconcile delivered ebook metadata into the overview workbook

mod commands;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a run date given as YYYYMMDD or YYYY-MM-DD
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("'{}' is not a date (expected YYYYMMDD)", s))
}

#[derive(Parser)]
#[command(name = "cbmeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write debug logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the delivery folders of an intake directory
    Run {
        /// Intake directory with delivery folders and the overview workbook
        #[arg(env = "CBMETA_ROOT")]
        root: PathBuf,

        /// Where processed folders are moved (default: <ROOT>/done)
        #[arg(long, env = "CBMETA_DONE_DIR")]
        done_dir: Option<PathBuf>,

        /// Date stamped into output names (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Start from an empty overview when no overview workbook exists
        #[arg(long)]
        allow_missing_overview: bool,

        /// Show what would be produced without writing or moving anything
        #[arg(long)]
        dry_run: bool,

        /// Number of folders scanned in parallel (must be at least 1)
        #[arg(short, long, default_value = "1", value_parser = parse_jobs)]
        jobs: usize,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the normalized metadata of one delivered file
    Inspect {
        /// EPUB or PDF named TIMESTAMP_IDENTIFIER.EXT
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = if verbose {
        "cbmeta_cli=debug,cbmeta_core=debug"
    } else {
        "cbmeta_cli=info,cbmeta_core=warn"
    };
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)));

    let file = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("cbmeta_cli=debug,cbmeta_core=debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_ref())?;

    match cli.command {
        Commands::Run {
            root,
            done_dir,
            date,
            allow_missing_overview,
            dry_run,
            jobs,
            json,
        } => commands::run(commands::RunArgs {
            root,
            done_dir,
            date,
            allow_missing_overview,
            dry_run,
            jobs,
            json,
        }),

        Commands::Inspect { input, json } => commands::inspect(&input, json),
    }
}
