//! Configuration to acknowledge repository layout preferences as well as set defaults.
//!
//! Specifically, we try to find a bundle-channel.toml, and if present we load settings from there.
//! This provides the charm list location, where charm checkouts live, which directories of a
//! charm hold bundles, and which file suffixes count as bundles.

use crate::error::{Error, Result};
use facet::Facet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "bundle-channel.toml";

#[derive(Facet, Clone, Debug)]
/// Repository layout loaded from bundle-channel.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "charms.txt".to_string())]
    /// File listing the charms whose bundle entries are updated.
    pub charms_file: String,
    #[facet(default = "charms".to_string())]
    /// Directory containing one checkout per charm.
    pub charms_root: String,
    #[facet(default = vec![
        "tests/bundles".to_string(),
        "tests/bundles/overlays".to_string(),
        "src/tests/bundles".to_string(),
        "src/tests/bundles/overlays".to_string(),
    ])]
    /// Bundle directories relative to a charm checkout; missing ones are skipped.
    pub bundle_dirs: Vec<String>,
    #[facet(default = vec![".yaml".to_string(), ".yaml.j2".to_string()])]
    /// File suffixes to match when scanning bundle directories.
    pub file_extensions: Vec<String>,
}

impl Config {
    /// Load configuration from bundle-channel.toml in the working directory if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from `path`, using defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::parse("");
        }
        debug!("Reading configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&contents)
    }

    /// Parse configuration text; every key is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn parse(contents: &str) -> Result<Self> {
        facet_toml::from_str::<Self>(contents).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
