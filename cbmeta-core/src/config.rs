//! Pipeline configuration

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Subdirectories of the intake root that are never scanned
pub const DEFAULT_EXCLUDED_DIRS: [&str; 4] = ["done", "pdfs", "fictief", "archief"];

/// Where a run reads from and writes to, plus run options
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Intake directory holding delivery folders and the overview workbook
    pub root: PathBuf,

    /// Processed delivery folders are moved here
    pub done_dir: PathBuf,

    /// Archive workbooks are written here
    pub archive_dir: PathBuf,

    /// The previous overview workbook is moved here
    pub old_overview_dir: PathBuf,

    /// Subdirectory names of `root` to skip
    pub excluded_dirs: Vec<String>,

    /// Date stamped into artifact names
    pub run_date: NaiveDate,

    /// Start from an empty overview when none exists instead of failing
    pub allow_missing_overview: bool,

    /// Compute everything but write and move nothing
    pub dry_run: bool,

    /// Folders scanned in parallel
    pub jobs: usize,
}

impl PipelineConfig {
    /// Configuration with the conventional layout under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let archive_dir = root.join("archief");
        Self {
            done_dir: root.join("done"),
            old_overview_dir: archive_dir.join("oude overzichtsbestanden"),
            archive_dir,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            run_date: chrono::Local::now().date_naive(),
            allow_missing_overview: false,
            dry_run: false,
            jobs: 1,
            root,
        }
    }

    /// Use a different done directory
    pub fn with_done_dir(mut self, done_dir: impl Into<PathBuf>) -> Self {
        self.done_dir = done_dir.into();
        self
    }

    /// Stamp artifacts with a fixed date
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = date;
        self
    }

    pub fn with_allow_missing_overview(mut self, allow: bool) -> Self {
        self.allow_missing_overview = allow;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == dir_name)
    }

    /// `YYYYMMDD` stamp of the run date
    pub fn date_stamp(&self) -> String {
        self.run_date.format("%Y%m%d").to_string()
    }

    /// Path of the overview workbook this run writes
    pub fn overview_output(&self) -> PathBuf {
        self.root
            .join(format!("{}{}.xlsx", OVERVIEW_PREFIX, self.date_stamp()))
    }

    /// Path of the archive workbook this run writes
    pub fn archive_output(&self) -> PathBuf {
        self.archive_dir
            .join(format!("{}{}.xlsx", ARCHIVE_PREFIX, self.date_stamp()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Filename prefix of overview workbooks
pub const OVERVIEW_PREFIX: &str = "overzicht_metadata_CB_";

/// Filename prefix of archive workbooks
pub const ARCHIVE_PREFIX: &str = "archiefbestand_metadata_CB_";
