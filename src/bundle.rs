//! Reading bundles, running the upsert pass over them, and replacing them atomically.
//!
//! A bundle is only ever replaced by renaming a fully written temporary file from the same
//! directory over it, so an interrupted run leaves either the old or the new contents.

use crate::edit_plan::EditPlan;
use crate::error::{Error, Result};
use crate::upsert::{upsert_with_changes, Change};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether rewritten bundles are persisted.
pub enum WriteMode {
    /// Replace bundles on disk.
    Write,
    /// Compute changes without touching any file.
    DryRun,
}

#[must_use]
/// Split text into lines, keeping each line's terminator.
pub fn split_lines(contents: &str) -> Vec<&str> {
    contents.split_inclusive('\n').collect()
}

/// Read a whole file as lines with their terminators.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(split_lines(&contents)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Replace `path` with `contents` via a temporary file in the same directory.
///
/// Permissions of an existing target are carried over to the replacement.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or the rename fails.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io(tmp.path(), e))?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions())
            .map_err(|e| Error::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Set `channel: <channel>` for every trigger charm in one bundle.
///
/// The bundle is rewritten only in [`WriteMode::Write`] and only if its contents change.
///
/// # Errors
///
/// Returns an error if the bundle cannot be read or replaced.
pub fn update_bundle(
    path: &Path,
    triggers: &HashSet<String>,
    channel: &str,
    mode: WriteMode,
) -> Result<Vec<Change>> {
    let lines = read_lines(path)?;
    let upserted = upsert_with_changes(&lines, triggers, channel);
    let rewritten = upserted.lines.concat();
    debug!("file:\n{rewritten}");

    if upserted.lines == lines {
        debug!("Unchanged: {}", path.display());
    } else if mode == WriteMode::DryRun {
        info!("Would update {}", path.display());
    } else {
        write_atomic(path, &rewritten)?;
        info!("Updated {}", path.display());
    }
    Ok(upserted.changes)
}

/// Update each bundle in turn, collecting the edits into a plan.
///
/// Processing stops at the first failure; bundles already replaced stay replaced.
///
/// # Errors
///
/// Returns the first read or write error encountered.
pub fn update_bundles(
    paths: &[PathBuf],
    triggers: &HashSet<String>,
    channel: &str,
    mode: WriteMode,
) -> Result<EditPlan> {
    let mut plan = EditPlan::default();
    for path in paths {
        let changes = update_bundle(path, triggers, channel, mode)?;
        plan.record(path, &changes, channel);
    }
    Ok(plan)
}

#[cfg(test)]
#[path = "tests/bundle.rs"]
mod tests;
