//! Run command implementation

use anyhow::{Context, Result};
use cbmeta_core::{Pipeline, PipelineConfig, ProgressObserver, RunReport};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Options of the run command
pub struct RunArgs {
    pub root: PathBuf,
    pub done_dir: Option<PathBuf>,
    pub date: Option<NaiveDate>,
    pub allow_missing_overview: bool,
    pub dry_run: bool,
    pub jobs: usize,
    pub json: bool,
}

/// Folder progress shown as a bar
struct FolderProgress {
    bar: ProgressBar,
}

impl ProgressObserver for FolderProgress {
    fn on_start(&self, folders: usize) {
        self.bar.set_length(folders as u64);
    }

    fn on_folder_done(&self, folder: &Path) {
        if let Some(name) = folder.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish_with_message("folders scanned");
    }
}

/// Process every delivery folder under the root
pub fn run(args: RunArgs) -> Result<()> {
    let mut config = PipelineConfig::new(&args.root)
        .with_allow_missing_overview(args.allow_missing_overview)
        .with_dry_run(args.dry_run)
        .with_jobs(args.jobs);
    if let Some(done_dir) = args.done_dir {
        config = config.with_done_dir(done_dir);
    }
    if let Some(date) = args.date {
        config = config.with_run_date(date);
    }

    let bar = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")?
            .progress_chars("##-"),
    );
    let progress = FolderProgress { bar };

    tracing::info!(
        "Processing deliveries in {:?} (jobs: {}, dry run: {})",
        args.root,
        config.jobs,
        config.dry_run
    );

    let outcome = Pipeline::new(config)
        .run(&progress)
        .with_context(|| format!("Processing {} failed", args.root.display()))?;

    log_report(&outcome.report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        print_report(&outcome.report);
    }

    Ok(())
}

fn log_report(report: &RunReport) {
    for skipped in &report.skipped {
        tracing::warn!("Skipped {:?}: {}", skipped.path, skipped.reason);
    }
    for path in &report.degraded {
        tracing::warn!("Kept {:?} with empty metadata", path);
    }
    if let Some(path) = &report.archive_path {
        tracing::info!("Archive workbook written to {:?} ({} rows)", path, report.archive_rows);
    }
    if let Some(path) = &report.overview_path {
        tracing::info!("Overview workbook written to {:?} ({} rows)", path, report.overview_rows);
    }
    tracing::info!("Moved {} processed folders", report.moved_folders.len());
}

fn print_report(report: &RunReport) {
    println!("\nProcessed {} folders:", report.folders.len());
    println!("  EPUB files:        {}", report.epubs);
    println!("  PDF files:         {}", report.pdfs);
    println!("  Delivery records:  {}", report.delivery_records);
    println!("  New rows:          {}", report.archive_rows);
    println!("  Overview rows:     {}", report.overview_rows);

    if !report.degraded.is_empty() {
        println!("\n{} EPUB files could not be read (kept with empty metadata):", report.degraded.len());
        for path in &report.degraded {
            println!("  {}", path.display());
        }
    }
    if !report.skipped.is_empty() {
        println!("\n{} files skipped:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    if report.dry_run {
        println!("\nDry run: nothing written or moved.");
        return;
    }

    println!();
    if let Some(path) = &report.archive_path {
        println!("Archive workbook {} is ready.", path.display());
    }
    if let Some(path) = &report.overview_path {
        println!("Overview workbook {} is ready.", path.display());
    }
    if let Some(path) = &report.archived_overview {
        println!("Previous overview moved to {}.", path.display());
    }
    if let Some(first) = report.moved_folders.first() {
        if let Some(done_dir) = first.parent() {
            println!(
                "Moved {} processed folders to {}.",
                report.moved_folders.len(),
                done_dir.display()
            );
        }
    }
}
