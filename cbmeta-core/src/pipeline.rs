//! Batch pipeline: scan delivery folders, reconcile, write artifacts, relocate
//!
//! A run scans every non-excluded folder of the intake root, builds the
//! new-data table from EPUB, PDF and delivery feed input, reconciles it into
//! the overview workbook and writes both the archive and the new overview.
//! Processed folders and the previous overview are then moved out of the way.

use crate::accumulator::Accumulator;
use crate::config::PipelineConfig;
use crate::decoder::{decoder_for_path, SourceKind};
use crate::delivery::{delivery_table, read_feed_dir};
use crate::error::Result;
use crate::merge::{assemble_new_data, reconcile};
use crate::types::{columns, DeliveryRecord, Table};
use crate::workbook::{read_workbook, write_workbook};
use crate::workspace::{discover_folders, list_files, locate_overview, move_into};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Receives folder-level progress; called from worker threads
pub trait ProgressObserver: Sync {
    fn on_start(&self, _folders: usize) {}

    fn on_folder_done(&self, _folder: &Path) {}

    fn on_finish(&self) {}
}

/// Observer that ignores progress
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// A file that was left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything read from one delivery folder
#[derive(Debug, Default)]
pub struct FolderScan {
    pub epubs: Accumulator,
    pub pdfs: Accumulator,
    pub deliveries: Vec<DeliveryRecord>,
    pub skipped: Vec<SkippedFile>,
    pub degraded: Vec<PathBuf>,
}

/// Decode the EPUBs and PDFs of one folder and read its delivery feeds.
///
/// A file violating the naming convention is skipped, not fatal; a package
/// that cannot be read is kept with empty metadata.
pub fn scan_folder(folder: &Path) -> Result<FolderScan> {
    let mut scan = FolderScan::default();

    for path in list_files(folder)? {
        let Some(decoder) = decoder_for_path(&path) else {
            continue;
        };
        match decoder.decode(&path) {
            Ok(decoded) => {
                if decoded.degraded.is_some() {
                    scan.degraded.push(path.clone());
                }
                match decoded.kind {
                    SourceKind::Epub => scan.epubs.push(&decoded.record),
                    SourceKind::Pdf => scan.pdfs.push(&decoded.record),
                }
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                scan.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    scan.deliveries = read_feed_dir(folder)?;
    tracing::debug!(
        "Scanned {:?}: {} epub, {} pdf, {} delivery records",
        folder,
        scan.epubs.len(),
        scan.pdfs.len(),
        scan.deliveries.len()
    );
    Ok(scan)
}

/// Summary of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub folders: Vec<PathBuf>,
    pub epubs: usize,
    pub pdfs: usize,
    pub delivery_records: usize,
    pub skipped: Vec<SkippedFile>,
    pub degraded: Vec<PathBuf>,

    /// Overview workbook the run started from
    pub overview_source: Option<PathBuf>,

    pub archive_rows: usize,
    pub overview_rows: usize,
    pub dry_run: bool,

    pub archive_path: Option<PathBuf>,
    pub overview_path: Option<PathBuf>,

    /// Where the previous overview was moved
    pub archived_overview: Option<PathBuf>,

    /// Where the processed folders were moved
    pub moved_folders: Vec<PathBuf>,
}

/// Tables computed by a run, with its report
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// This run's rows only
    pub archive: Table,

    /// Overview after reconciliation
    pub overview: Table,

    pub report: RunReport,
}

/// Runs the batch for one configuration
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the whole batch
    pub fn run(&self, progress: &dyn ProgressObserver) -> Result<RunOutcome> {
        let config = &self.config;
        let mut report = RunReport {
            dry_run: config.dry_run,
            ..RunReport::default()
        };

        let folders = discover_folders(config)?;
        // Fail before anything is touched when the overview cannot be resolved
        let overview_source = locate_overview(&config.root, config.allow_missing_overview)?;
        if overview_source.is_none() {
            tracing::warn!("No overview workbook found, starting from an empty overview");
        }

        progress.on_start(folders.len());
        let scans = self.scan_all(&folders, progress)?;
        progress.on_finish();

        let mut epubs = Accumulator::new();
        let mut pdfs = Accumulator::new();
        let mut deliveries = Vec::new();
        for scan in scans {
            epubs.append(scan.epubs);
            pdfs.append(scan.pdfs);
            deliveries.extend(scan.deliveries);
            report.skipped.extend(scan.skipped);
            report.degraded.extend(scan.degraded);
        }
        report.epubs = epubs.len();
        report.pdfs = pdfs.len();
        report.delivery_records = deliveries.len();

        let archive = assemble_new_data(epubs.into_table(), pdfs.into_table(), &delivery_table(&deliveries));

        let previous = match &overview_source {
            Some(path) => read_workbook(path)?,
            None => Table::with_columns(columns::DISPLAY_SCHEMA.iter().map(|(_, name)| *name)),
        };
        let overview = reconcile(&previous, &archive);

        report.folders = folders.clone();
        report.overview_source = overview_source.clone();
        report.archive_rows = archive.len();
        report.overview_rows = overview.len();

        if config.dry_run {
            tracing::info!("Dry run: nothing written or moved");
        } else {
            self.publish(&archive, &overview, overview_source.as_deref(), &folders, &mut report)?;
        }

        Ok(RunOutcome {
            archive,
            overview,
            report,
        })
    }

    fn scan_all(&self, folders: &[PathBuf], progress: &dyn ProgressObserver) -> Result<Vec<FolderScan>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        // Results come back in folder order regardless of scheduling
        let scans: Vec<Result<FolderScan>> = pool.install(|| {
            folders
                .par_iter()
                .map(|folder| {
                    let scan = scan_folder(folder);
                    progress.on_folder_done(folder);
                    scan
                })
                .collect()
        });
        scans.into_iter().collect()
    }

    /// Write the artifacts, then relocate the old overview and the processed folders
    fn publish(
        &self,
        archive: &Table,
        overview: &Table,
        overview_source: Option<&Path>,
        folders: &[PathBuf],
        report: &mut RunReport,
    ) -> Result<()> {
        let config = &self.config;

        fs::create_dir_all(&config.archive_dir)?;
        let archive_path = config.archive_output();
        write_workbook(archive, &archive_path)?;
        tracing::info!("Archive workbook written to {:?}", archive_path);
        report.archive_path = Some(archive_path);

        let overview_path = config.overview_output();
        write_workbook(overview, &overview_path)?;
        tracing::info!("Overview workbook written to {:?}", overview_path);
        report.overview_path = Some(overview_path.clone());

        // A same-day rerun overwrites the previous overview in place
        if let Some(source) = overview_source.filter(|s| *s != overview_path) {
            report.archived_overview = Some(move_into(source, &config.old_overview_dir)?);
        }

        for folder in folders {
            report.moved_folders.push(move_into(folder, &config.done_dir)?);
        }
        Ok(())
    }
}
