//! # Error Paths
//!
//! Locator strings emitted by a validation engine, e.g. `account.name` or
//! `friends[0].name`. A path is a sequence of field segments and array-index
//! segments. A leading `$` root marker is accepted and ignored.
//!
//! Parsing is lenient and never fails: error aggregation must always be able
//! to process whatever the engine produced. A bracket group that is not a
//! decimal index is kept verbatim as part of the field name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One step in an [`ErrorPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// A zero-based array element index.
    Index(usize),
}

impl PathSegment {
    /// Returns the field name if this is a field segment.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// Returns true for array-index segments.
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

/// A dotted/indexed location inside an object graph.
///
/// The empty path denotes the root instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ErrorPath(Vec<PathSegment>);

impl ErrorPath {
    /// The root location.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from explicit segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse a dotted/indexed path string.
    pub fn parse(input: &str) -> Self {
        let mut segments = Vec::new();
        let mut field = String::new();
        let mut chars = input.trim().chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => flush_field(&mut field, &mut segments),
                '[' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    let numeric = !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit());
                    match inner.parse::<usize>() {
                        Ok(index) if closed && numeric => {
                            flush_field(&mut field, &mut segments);
                            segments.push(PathSegment::Index(index));
                        }
                        _ => {
                            field.push('[');
                            field.push_str(&inner);
                            if closed {
                                field.push(']');
                            }
                        }
                    }
                }
                other => field.push(other),
            }
        }
        flush_field(&mut field, &mut segments);

        if segments.first().and_then(PathSegment::as_field) == Some("$") {
            segments.remove(0);
        }
        Self(segments)
    }

    /// Convert an RFC 6901 JSON Pointer (`/friends/0/name`) into a path.
    ///
    /// Every all-digit reference token is read as an array index.
    pub fn from_json_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .skip(1)
            .map(|token| {
                let token = token.replace("~1", "/").replace("~0", "~");
                match token.parse::<usize>() {
                    Ok(index) if token.bytes().all(|b| b.is_ascii_digit()) => {
                        PathSegment::Index(index)
                    }
                    _ => PathSegment::Field(token),
                }
            })
            .collect();
        Self(segments)
    }

    /// Returns true for the root location.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path's segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// The location of a field beneath this one.
    pub fn child(&self, field: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(field.to_string()));
        Self(segments)
    }

    /// The location of an array element beneath this one.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Append another path to this one.
    pub fn join(&self, other: &ErrorPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// The segments remaining after `prefix`, if this path lies at or beneath it.
    pub fn strip_prefix(&self, prefix: &ErrorPath) -> Option<&[PathSegment]> {
        self.0.strip_prefix(prefix.0.as_slice())
    }

    /// Returns true if this path lies at or beneath `prefix`.
    pub fn starts_with(&self, prefix: &ErrorPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

fn flush_field(field: &mut String, segments: &mut Vec<PathSegment>) {
    if !field.is_empty() {
        segments.push(PathSegment::Field(std::mem::take(field)));
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for ErrorPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ErrorPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for ErrorPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
