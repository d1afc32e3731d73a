//! The list of charms whose bundle entries get a channel, one name per line.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read charm names from `path`, trimming whitespace and skipping blank lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_charm_list(path: &Path) -> Result<HashSet<String>> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let charms = parse_charm_list(&contents);
    debug!("Loaded {} charms from {}", charms.len(), path.display());
    Ok(charms)
}

#[must_use]
/// Parse the contents of a charm list file.
pub fn parse_charm_list(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "tests/charms.rs"]
mod tests;
