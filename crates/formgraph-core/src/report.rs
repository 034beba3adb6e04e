//! # Validation Engine Boundary
//!
//! formgraph does not define validation rules. An external engine implements
//! [`Validate`] and hands back a [`ValidationReport`]: validity plus a flat,
//! ordered list of `(path, message)` entries for the whole tree it was given.
//!
//! A report is plain data. An empty report means "valid", and every consumer
//! must handle it; aggregation over a report never fails.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::ErrorPath;
use crate::schema::SchemaNode;

/// A validation engine.
pub trait Validate {
    /// Failure to *run* the engine (e.g. a schema it cannot compile).
    /// Validation failures are reported as entries, not as this error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Validate `data` against `schema`, producing paths relative to `data`.
    fn validate(&self, schema: &SchemaNode, data: &Value) -> Result<ValidationReport, Self::Error>;
}

/// One failed rule at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Where the failure applies.
    pub path: ErrorPath,
    /// Human-readable message.
    pub message: String,
}

impl ErrorEntry {
    /// Build an entry from a path string and message.
    pub fn new(path: impl Into<ErrorPath>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The engine's output for one tree: an ordered list of failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    entries: Vec<ErrorEntry>,
}

impl ValidationReport {
    /// An empty (valid) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a report from `(path, message)` pairs, preserving their order.
    pub fn from_pairs<I, P, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, M)>,
        P: AsRef<str>,
        M: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(p, m)| ErrorEntry::new(ErrorPath::parse(p.as_ref()), m))
                .collect(),
        }
    }

    /// Append a failure.
    pub fn push(&mut self, path: ErrorPath, message: impl Into<String>) {
        self.entries.push(ErrorEntry {
            path,
            message: message.into(),
        });
    }

    /// True when the engine reported no failures.
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in engine order.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Entries at or beneath `prefix`.
    pub fn beneath<'a>(&'a self, prefix: &'a ErrorPath) -> impl Iterator<Item = &'a ErrorEntry> + 'a {
        self.entries.iter().filter(move |e| e.path.starts_with(prefix))
    }

    /// Re-anchor every path beneath `prefix`.
    ///
    /// An engine run over a nested instance reports paths relative to that
    /// instance; rebasing makes them root-relative again.
    pub fn rebased(self, prefix: &ErrorPath) -> Self {
        if prefix.is_root() {
            return self;
        }
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|e| ErrorEntry {
                    path: prefix.join(&e.path),
                    message: e.message,
                })
                .collect(),
        }
    }

    /// Consumes self and returns the inner entries.
    pub fn into_inner(self) -> Vec<ErrorEntry> {
        self.entries
    }
}

impl FromIterator<ErrorEntry> for ValidationReport {
    fn from_iter<T: IntoIterator<Item = ErrorEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn from_pairs_keeps_order_and_duplicates() {
        let report = ValidationReport::from_pairs([
            ("name", "is required"),
            ("friends[0].name", "is required"),
            ("name", "is too short"),
        ]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.entries()[2].path, ErrorPath::parse("name"));
        assert_eq!(report.entries()[2].message, "is too short");
    }

    #[test]
    fn rebasing_prefixes_every_path() {
        let prefix = ErrorPath::root().child("friends").index(2);
        let report = ValidationReport::from_pairs([("name", "blank"), ("age", "not an integer")])
            .rebased(&prefix);
        let paths: Vec<String> = report.entries().iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["friends[2].name", "friends[2].age"]);
    }

    #[test]
    fn beneath_filters_by_prefix() {
        let report = ValidationReport::from_pairs([
            ("name", "a"),
            ("friends[0].name", "b"),
            ("friends[1].name", "c"),
        ]);
        let prefix = ErrorPath::parse("friends[1]");
        let hits: Vec<&str> = report.beneath(&prefix).map(|e| e.message.as_str()).collect();
        assert_eq!(hits, ["c"]);
    }

    #[test]
    fn display_lists_entries() {
        let report = ValidationReport::from_pairs([("", "bad root"), ("name", "blank")]);
        assert_eq!(report.to_string(), "  (root): bad root\n  name: blank");
    }
}
