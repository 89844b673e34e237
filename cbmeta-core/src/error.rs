//! Error types for cbmeta core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CbMetaError
pub type Result<T> = std::result::Result<T, CbMetaError>;

/// Top-level error type for all cbmeta operations
#[derive(Debug, Error)]
pub enum CbMetaError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while reading input files
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Invalid delivery feed: {0}")]
    InvalidFeed(String),

    #[error("Filename {name:?} does not match TIMESTAMP_IDENTIFIER.EXT: {reason}")]
    Filename { name: String, reason: &'static str },
}

/// A raw metadata field that a normalizer could not turn into a scalar.
///
/// The extractor keeps the raw text for the field when this happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("field '{0}' has no entries")]
    EmptyField(&'static str),

    #[error("field '{0}' has an entry without a value")]
    NoValue(&'static str),
}

/// Errors that occur reading or writing spreadsheet artifacts
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Sheet '{sheet}' in {path} has no header row")]
    MissingHeader { path: PathBuf, sheet: String },
}

/// Errors about the on-disk intake layout
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("No overview workbook matching '{pattern}' found")]
    OverviewMissing { pattern: String },

    #[error("Expected one overview workbook, found {}: {}", .0.len(), display_paths(.0))]
    OverviewAmbiguous(Vec<PathBuf>),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Cannot move {from} to {to}: target already exists")]
    TargetExists { from: PathBuf, to: PathBuf },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
