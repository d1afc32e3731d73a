//! The risk levels a charm can be pinned to in a bundle.

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Charmhub channel risk level written as the value of `channel:`.
pub enum Channel {
    /// Production releases.
    Stable,
    /// Release candidates.
    Candidate,
    /// Beta builds.
    Beta,
    /// Latest builds from the development branch.
    Edge,
}

impl Channel {
    /// Every accepted channel, in order of decreasing stability.
    pub const ALL: [Channel; 4] = [
        Channel::Stable,
        Channel::Candidate,
        Channel::Beta,
        Channel::Edge,
    ];

    #[must_use]
    /// Lower-case name as written in bundles.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Candidate => "candidate",
            Channel::Beta => "beta",
            Channel::Edge => "edge",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == lowered)
            .ok_or_else(|| Error::InvalidChannel(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/channel.rs"]
mod tests;
