//! On-disk intake layout: delivery folders, overview discovery, relocation

use crate::config::{PipelineConfig, OVERVIEW_PREFIX};
use crate::error::WorkspaceError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Non-excluded subdirectories of the intake root, sorted
pub fn discover_folders(config: &PipelineConfig) -> io::Result<Vec<PathBuf>> {
    let mut folders: Vec<PathBuf> = fs::read_dir(&config.root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| !config.is_excluded(name))
                .unwrap_or(true)
        })
        .map(|e| e.path())
        .collect();
    folders.sort();
    Ok(folders)
}

/// Regular files directly inside a folder, sorted
pub fn list_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Overview workbooks in the root matching `overzicht_metadata_CB_*.xlsx`
pub fn find_overviews(root: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
    let root_str = root
        .to_str()
        .ok_or_else(|| WorkspaceError::NonUtf8Path(root.to_path_buf()))?;
    let pattern = format!(
        "{}/{}*.xlsx",
        glob::Pattern::escape(root_str),
        OVERVIEW_PREFIX
    );

    let paths = glob::glob(&pattern).map_err(|e| WorkspaceError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut found: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Unreadable path while searching overviews: {}", e);
                None
            }
        })
        .filter(|p| p.is_file())
        .collect();
    found.sort();
    Ok(found)
}

/// The single overview workbook of the root.
///
/// `Ok(None)` when there is none and `allow_missing` is set; otherwise a
/// missing or ambiguous overview is an error.
pub fn locate_overview(root: &Path, allow_missing: bool) -> Result<Option<PathBuf>, WorkspaceError> {
    let mut found = find_overviews(root)?;
    match found.len() {
        0 if allow_missing => Ok(None),
        0 => Err(WorkspaceError::OverviewMissing {
            pattern: root.join(format!("{}*.xlsx", OVERVIEW_PREFIX)).display().to_string(),
        }),
        1 => Ok(found.pop()),
        _ => Err(WorkspaceError::OverviewAmbiguous(found)),
    }
}

/// Move a file or folder into `dest_dir`, keeping its name.
///
/// `dest_dir` is created when missing; an existing target is never replaced.
pub fn move_into(src: &Path, dest_dir: &Path) -> crate::Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let target = dest_dir.join(name);
    if target.exists() {
        return Err(WorkspaceError::TargetExists {
            from: src.to_path_buf(),
            to: target,
        }
        .into());
    }

    fs::create_dir_all(dest_dir)?;
    fs::rename(src, &target)?;
    tracing::info!("Moved {:?} -> {:?}", src, target);
    Ok(target)
}
