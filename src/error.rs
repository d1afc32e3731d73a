//! Error type shared by everything outside the pure upsert pass.
//!
//! The line transform itself cannot fail; these variants cover the shell around it:
//! configuration, the filesystem, and the external `charmcraft`/`git` commands.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures surfaced by configuration, discovery, bundle rewriting and staleness checks.
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation on `path` failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory being read, listed, written or renamed.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The requested channel is not one of the known risk levels.
    #[error("Channel must be one of stable, candidate, beta or edge (got {0:?})")]
    InvalidChannel(String),

    /// The charm checkout to scan does not exist.
    #[error("Charm dir {} doesn't exist", .0.display())]
    MissingCharmDir(PathBuf),

    /// An external command could not be run or exited unsuccessfully.
    #[error("`{program}` failed: {message}")]
    Command {
        /// Program name as invoked.
        program: String,
        /// Spawn error or captured stderr.
        message: String,
    },

    /// External command output was not the JSON we expected.
    #[error("Unexpected JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A date could not be interpreted.
    #[error("Unparsable timestamp {value:?}: {message}")]
    Timestamp {
        /// Raw text that was parsed.
        value: String,
        /// Parser diagnostic.
        message: String,
    },

    /// Neither a single charm nor a directory of charms was given.
    #[error("You must specify either --charm-name or --charm-dir")]
    NoCharmsSelected,
}

impl Error {
    /// Attach a path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[must_use]
    /// Pointer to the relevant `--help` for errors caused by how the tool was invoked.
    pub fn usage_hint(&self) -> Option<&'static str> {
        match self {
            Error::InvalidChannel(_) | Error::MissingCharmDir(_) => {
                Some("usage: bundle-channel set <CHARM> <CHANNEL>\nTry 'bundle-channel set --help' for more information.")
            }
            Error::NoCharmsSelected => {
                Some("usage: bundle-channel stale (--charm-name <NAME> | --charm-dir <DIR>) ...\nTry 'bundle-channel stale --help' for more information.")
            }
            _ => None,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "tests/error.rs"]
mod tests;
