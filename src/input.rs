//! Locating charm checkouts and the bundle files inside them.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the checkout directory for `charm_name` under `charms_root`.
///
/// The name is lower-cased, matching how checkouts are named.
///
/// # Errors
///
/// Returns [`Error::MissingCharmDir`] if the directory does not exist.
pub fn charm_dir(charms_root: &Path, charm_name: &str) -> Result<PathBuf> {
    let dir = charms_root.join(charm_name.to_lowercase());
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(Error::MissingCharmDir(dir))
    }
}

#[must_use]
/// Candidate bundle directories of a charm checkout that actually exist.
pub fn find_bundle_dirs<S: AsRef<str>>(charm_dir: &Path, candidates: &[S]) -> Vec<PathBuf> {
    candidates
        .iter()
        .map(|relative| charm_dir.join(relative.as_ref()))
        .filter(|dir| {
            debug!("Searching: {}", dir.display());
            dir.is_dir()
        })
        .collect()
}

/// Regular files directly inside `dir` whose names end with one of `suffixes`.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn find_bundles<S: AsRef<str>>(dir: &Path, suffixes: &[S]) -> Result<Vec<PathBuf>> {
    debug!("Scanning: {}", dir.display());
    let mut bundles = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && has_suffix(&path, suffixes) {
            bundles.push(path);
        }
    }
    bundles.sort();
    Ok(bundles)
}

/// All bundles across `dirs`, de-duplicated and sorted.
///
/// # Errors
///
/// Returns an error if any directory cannot be listed.
pub fn find_bundles_in_dirs<S: AsRef<str>>(
    dirs: &[PathBuf],
    suffixes: &[S],
) -> Result<Vec<PathBuf>> {
    let mut bundles = BTreeSet::new();
    for dir in dirs {
        bundles.extend(find_bundles(dir, suffixes)?);
    }
    Ok(bundles.into_iter().collect())
}

fn has_suffix<S: AsRef<str>>(path: &Path, suffixes: &[S]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_ref())))
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
