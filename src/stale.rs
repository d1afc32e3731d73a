//! Finding charms whose git branch has moved on since the revision released to a channel.
//!
//! For each charm checkout we ask `charmcraft status` which revision is released to the
//! queried track/base/architecture/channel, ask `charmcraft revisions` when that revision
//! was created, and compare it with the date of the last commit on the remote branch.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Runs external programs and returns their trimmed standard output.
pub trait CommandRunner {
    /// Run `program` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] if the program cannot be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runs programs as child processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("Running: {program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::Command {
                program: program.to_string(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::Command {
                program: program.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which charmhub release to compare against.
pub struct ReleaseQuery {
    /// Track name, e.g. `squid`.
    pub track: String,
    /// Base channel, e.g. `22.04`.
    pub base_channel: String,
    /// Architecture, e.g. `amd64`.
    pub architecture: String,
    /// Full channel name, e.g. `squid/candidate`.
    pub channel: String,
}

#[derive(Deserialize)]
struct TrackStatus {
    track: String,
    #[serde(default)]
    mappings: Vec<Mapping>,
}

#[derive(Deserialize)]
struct Mapping {
    #[serde(default)]
    base: Option<Base>,
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Deserialize)]
struct Base {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    architecture: String,
}

#[derive(Deserialize)]
struct Release {
    channel: String,
    #[serde(default)]
    revision: Option<u64>,
}

#[derive(Deserialize)]
struct RevisionInfo {
    revision: u64,
    #[serde(default)]
    created_at: Option<String>,
}

/// Revision released to the queried channel, from `charmcraft status --format json` output.
///
/// # Errors
///
/// Returns an error if the output is not the expected JSON.
pub fn released_revision(status_json: &str, query: &ReleaseQuery) -> Result<Option<u64>> {
    let tracks: Vec<TrackStatus> = serde_json::from_str(status_json)?;
    Ok(tracks
        .iter()
        .filter(|status| status.track == query.track)
        .flat_map(|status| &status.mappings)
        .filter(|mapping| {
            mapping.base.as_ref().is_some_and(|base| {
                base.channel == query.base_channel && base.architecture == query.architecture
            })
        })
        .flat_map(|mapping| &mapping.releases)
        .filter(|release| release.channel == query.channel)
        .find_map(|release| release.revision))
}

/// Creation date of `revision`, from `charmcraft revisions --format json` output.
///
/// # Errors
///
/// Returns an error if the output is not the expected JSON.
pub fn revision_created_at(revisions_json: &str, revision: u64) -> Result<Option<String>> {
    let revisions: Vec<RevisionInfo> = serde_json::from_str(revisions_json)?;
    Ok(revisions
        .into_iter()
        .filter(|info| info.revision == revision)
        .find_map(|info| info.created_at))
}

/// Parse a date as printed by charmcraft (ISO 8601) or by `git log --format=%ci`.
///
/// Dates without an offset are taken to be UTC.
///
/// # Errors
///
/// Returns [`Error::Timestamp`] if no known format matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp);
    }
    if let Ok(timestamp) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(timestamp);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| Error::Timestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Date of the last commit on `origin/<branch>` in the checkout at `repo`, after fetching it.
///
/// # Errors
///
/// Returns an error if `git fetch` or `git log` fails.
pub fn last_commit_date<R: CommandRunner>(
    runner: &R,
    repo: &Path,
    branch: &str,
) -> Result<Option<String>> {
    let repo = repo.to_string_lossy().into_owned();
    runner.run("git", &["-C", repo.as_str(), "fetch", "origin", branch])?;
    let remote_branch = format!("origin/{branch}");
    let date = runner.run(
        "git",
        &["-C", repo.as_str(), "log", "-1", "--format=%ci", remote_branch.as_str()],
    )?;
    Ok(Some(date).filter(|date| !date.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A charm with commits newer than its released revision.
pub struct StaleCharm {
    /// Charm name.
    pub name: String,
    /// Revision released to the queried channel.
    pub revision: u64,
    /// When that revision was created, as reported by charmcraft.
    pub revision_date: String,
    /// Last commit date on the branch, as reported by git.
    pub commit_date: String,
}

impl fmt::Display for StaleCharm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Revision Date: {}, Commit Date: {}",
            self.name, self.revision_date, self.commit_date
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of checking one charm.
pub enum Outcome {
    /// The branch has commits newer than the released revision.
    Stale(StaleCharm),
    /// The released revision is at least as new as the branch.
    Current,
    /// Some piece of information was missing; the message says which.
    Skipped(String),
}

fn charm_name(charm_path: &Path) -> String {
    charm_path.file_name().map_or_else(
        || charm_path.to_string_lossy().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}

/// Compare the released revision of the charm checked out at `charm_path` with its branch.
///
/// # Errors
///
/// Returns an error if a command fails, its output is malformed, or a date is unparsable.
pub fn check_charm<R: CommandRunner>(
    runner: &R,
    charm_path: &Path,
    query: &ReleaseQuery,
    branch: &str,
) -> Result<Outcome> {
    let name = charm_name(charm_path);

    let status = runner.run("charmcraft", &["status", name.as_str(), "--format", "json"])?;
    let Some(revision) = released_revision(&status, query)? else {
        return Ok(Outcome::Skipped(format!(
            "Failed to retrieve revision for charm '{name}'."
        )));
    };

    let revisions = runner.run("charmcraft", &["revisions", "--format", "json", name.as_str()])?;
    let Some(revision_date) = revision_created_at(&revisions, revision)? else {
        return Ok(Outcome::Skipped(format!(
            "Failed to retrieve revision date for charm '{name}'."
        )));
    };

    let Some(commit_date) = last_commit_date(runner, charm_path, branch)? else {
        return Ok(Outcome::Skipped(format!(
            "Failed to retrieve commit date for charm '{name}'."
        )));
    };

    if parse_timestamp(&commit_date)? > parse_timestamp(&revision_date)? {
        Ok(Outcome::Stale(StaleCharm {
            name,
            revision,
            revision_date,
            commit_date,
        }))
    } else {
        debug!("{name}: revision {revision} is current");
        Ok(Outcome::Current)
    }
}

/// Charm checkouts to inspect: each subdirectory of `charm_dir`, then `charm_name` itself.
///
/// # Errors
///
/// Returns an error if neither is given, or `charm_dir` is not a readable directory.
pub fn charm_paths(charm_name: Option<&str>, charm_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    if charm_name.is_none() && charm_dir.is_none() {
        return Err(Error::NoCharmsSelected);
    }

    let mut paths = Vec::new();
    if let Some(dir) = charm_dir {
        if !dir.is_dir() {
            return Err(Error::MissingCharmDir(dir.to_path_buf()));
        }
        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            if path.is_dir() {
                paths.push(path);
            }
        }
        paths.sort();
    }
    if let Some(name) = charm_name {
        paths.push(PathBuf::from(name));
    }
    Ok(paths)
}

/// Check every charm in `paths`, returning the stale ones.
///
/// Charms that cannot be checked are logged and skipped.
pub fn find_stale<R: CommandRunner>(
    runner: &R,
    paths: &[PathBuf],
    query: &ReleaseQuery,
    branch: &str,
) -> Vec<StaleCharm> {
    let mut stale = Vec::new();
    for path in paths {
        match check_charm(runner, path, query, branch) {
            Ok(Outcome::Stale(charm)) => stale.push(charm),
            Ok(Outcome::Current) => {}
            Ok(Outcome::Skipped(reason)) => warn!("{reason}"),
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }
    info!("{} of {} charms are stale", stale.len(), paths.len());
    stale
}

#[cfg(test)]
#[path = "tests/stale.rs"]
mod tests;
