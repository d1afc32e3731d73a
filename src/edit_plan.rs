//! The edit plan records what a run did (or, in a dry run, would do) to each bundle.
//!
//! Every `channel:` line written by the upsert pass becomes one [`Edit`]. The plan is
//! serialisable so it can be reviewed as JSON before or after bundles are touched.

use crate::error::Result;
use crate::upsert::{Change, ChangeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
/// Serialisable collection of `channel:` edits across bundles.
pub struct EditPlan {
    /// Individual line edits, grouped by file in processing order.
    pub edits: Vec<Edit>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Whether a `channel:` line was added or rewritten.
pub enum Action {
    /// Added at the end of the charm's block.
    Inserted,
    /// Existing line at the block's indent rewritten.
    Replaced,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Location and content of one `channel:` line.
pub struct Edit {
    /// Bundle file path.
    pub file_name: String,
    /// Line number in the rewritten file (1-based).
    pub line: usize,
    /// Insert or replace.
    pub action: Action,
    /// Charm whose block was edited.
    pub charm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Value before a replacement.
    pub previous: Option<String>,
    /// Value written.
    pub channel: String,
}

impl EditPlan {
    /// Record the changes the upsert pass made to `file`.
    pub fn record(&mut self, file: &Path, changes: &[Change], channel: &str) {
        let file_name = file.to_string_lossy().to_string();
        self.edits.extend(changes.iter().map(|change| {
            let (action, previous) = match &change.kind {
                ChangeKind::Inserted => (Action::Inserted, None),
                ChangeKind::Replaced { previous } => (Action::Replaced, Some(previous.clone())),
            };
            Edit {
                file_name: file_name.clone(),
                line: change.line + 1,
                action,
                charm: change.charm.clone(),
                previous,
                channel: channel.to_string(),
            }
        }));
    }

    #[must_use]
    /// True when no bundle needed a `channel:` line.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    #[must_use]
    /// Distinct files touched by the plan.
    pub fn files(&self) -> BTreeSet<&str> {
        self.edits
            .iter()
            .map(|edit| edit.file_name.as_str())
            .collect()
    }

    /// Render the plan as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
