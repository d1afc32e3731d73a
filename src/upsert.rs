//! Block-scoped upsert of the `channel:` key beside matching `charm:` keys.
//!
//! This is a line scanner, not a YAML parser. A block is opened by a `charm:` line whose
//! charm is in the trigger set, and is delimited purely by indentation: it lasts until the
//! first line that does not start with the `charm:` line's indent string. Within the block
//! a `channel:` line at exactly that indent is replaced; if the block ends without one, a
//! `channel:` line is inserted at the block's end.
//!
//! Indentation is compared as raw strings, so tabs and spaces are never normalised.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Anchor line: `charm: cs:~openstack-charmers/<name>` with an optional trailing comment.
pub const CHARM_PATTERN: &str =
    r"^(\s*)charm:\s+cs:(?:~openstack-charmers/|~openstack-charmers-next/)(\S+)\s*(?:#.*)?$";

/// Companion line: `channel: <value>` with an optional trailing comment.
pub const CHANNEL_PATTERN: &str = r"^(\s*)channel:\s+(\S+)\s*(?:#.*)?$";

macro_rules! cached_regex {
    ($pattern:expr) => {{
        static REGEX: OnceLock<Regex> = OnceLock::new();
        REGEX.get_or_init(|| Regex::new($pattern).unwrap_or_else(|e| panic!("{}", e)))
    }};
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A `charm:` line naming an openstack-charmers charm.
pub struct Anchor<'a> {
    /// Leading whitespace of the line, verbatim.
    pub indent: &'a str,
    /// Charm name after the namespace prefix.
    pub charm: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A `channel:` line.
pub struct Companion<'a> {
    /// Leading whitespace of the line, verbatim.
    pub indent: &'a str,
    /// Current channel value.
    pub value: &'a str,
}

#[must_use]
/// Match `line` (terminator optional) against [`CHARM_PATTERN`].
pub fn match_anchor(line: &str) -> Option<Anchor<'_>> {
    let caps = cached_regex!(CHARM_PATTERN).captures(strip_terminator(line))?;
    Some(Anchor {
        indent: caps.get(1)?.as_str(),
        charm: caps.get(2)?.as_str(),
    })
}

#[must_use]
/// Match `line` (terminator optional) against [`CHANNEL_PATTERN`].
pub fn match_companion(line: &str) -> Option<Companion<'_>> {
    let caps = cached_regex!(CHANNEL_PATTERN).captures(strip_terminator(line))?;
    Some(Companion {
        indent: caps.get(1)?.as_str(),
        value: caps.get(2)?.as_str(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Whether the scanner is inside a triggered block.
pub enum Scope {
    #[default]
    /// Looking for the next triggering `charm:` line.
    Closed,
    /// Inside the block opened by a triggering `charm:` line.
    Open {
        /// Indent of the `charm:` line; the block lasts while lines start with it.
        indent: String,
        /// Charm that opened the block.
        charm: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How a block's `channel:` line was produced.
pub enum ChangeKind {
    /// The block had no `channel:` line and one was added at its end.
    Inserted,
    /// An existing `channel:` line at the block's indent was rewritten.
    Replaced {
        /// Value on the line before rewriting.
        previous: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One `channel:` line written by the scanner.
pub struct Change {
    /// Zero-based index of the written line in the output.
    pub line: usize,
    /// Indent the line was written at.
    pub indent: String,
    /// Charm whose block the line belongs to.
    pub charm: String,
    /// Insert or replace.
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Output of a complete pass.
pub struct Upserted {
    /// Rewritten document lines, terminators included.
    pub lines: Vec<String>,
    /// Every `channel:` line written, in document order.
    pub changes: Vec<Change>,
}

/// Single-pass scanner; feed it lines in order, then call [`Upserter::finish`].
pub struct Upserter<'a> {
    triggers: &'a HashSet<String>,
    replacement: &'a str,
    scope: Scope,
    out: Upserted,
}

impl<'a> Upserter<'a> {
    #[must_use]
    /// Start a pass that sets `channel: <replacement>` in blocks of the trigger charms.
    pub fn new(triggers: &'a HashSet<String>, replacement: &'a str) -> Self {
        Self {
            triggers,
            replacement,
            scope: Scope::Closed,
            out: Upserted::default(),
        }
    }

    #[must_use]
    /// Current scope, for inspecting transitions.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Consume the next document line.
    pub fn feed(&mut self, line: &str) {
        if let Scope::Open { indent, charm } = std::mem::take(&mut self.scope) {
            if line.starts_with(indent.as_str()) {
                if let Some(companion) = match_companion(line).filter(|c| c.indent == indent) {
                    let previous = companion.value.to_string();
                    self.write_companion(indent, charm, ChangeKind::Replaced { previous });
                    return;
                }
                self.scope = Scope::Open { indent, charm };
            } else {
                // Block ended without a channel: key.
                self.write_companion(indent, charm, ChangeKind::Inserted);
            }
        }

        if let Some(anchor) = match_anchor(line) {
            if self.triggers.contains(anchor.charm) {
                self.scope = Scope::Open {
                    indent: anchor.indent.to_string(),
                    charm: anchor.charm.to_string(),
                };
            }
        }
        self.out.lines.push(line.to_string());
    }

    #[must_use]
    /// Close a block left open at end of document and return the result.
    ///
    /// When that insertion follows a last line with no terminator, `\n` is appended
    /// to that line first. This is the only case where an input line is not copied
    /// through byte for byte.
    pub fn finish(mut self) -> Upserted {
        if let Scope::Open { indent, charm } = std::mem::take(&mut self.scope) {
            if let Some(last) = self.out.lines.last_mut() {
                if !last.ends_with('\n') {
                    last.push('\n');
                }
            }
            self.write_companion(indent, charm, ChangeKind::Inserted);
        }
        self.out
    }

    fn write_companion(&mut self, indent: String, charm: String, kind: ChangeKind) {
        self.out
            .lines
            .push(format!("{indent}channel: {}\n", self.replacement));
        self.out.changes.push(Change {
            line: self.out.lines.len() - 1,
            indent,
            charm,
            kind,
        });
    }
}

#[must_use]
/// Run a full pass over `lines`, reporting each `channel:` line written.
pub fn upsert_with_changes<S: AsRef<str>>(
    lines: &[S],
    triggers: &HashSet<String>,
    replacement: &str,
) -> Upserted {
    let mut upserter = Upserter::new(triggers, replacement);
    for line in lines {
        upserter.feed(line.as_ref());
    }
    upserter.finish()
}

#[must_use]
/// Set `channel: <replacement>` in every block whose `charm:` is in `triggers`.
pub fn upsert<S: AsRef<str>>(
    lines: &[S],
    triggers: &HashSet<String>,
    replacement: &str,
) -> Vec<String> {
    upsert_with_changes(lines, triggers, replacement).lines
}

#[cfg(test)]
#[path = "tests/upsert.rs"]
mod tests;
