//! # Error Types
//!
//! Construction-time failures. Validation outcomes are never represented
//! here; they travel as [`ValidationReport`](crate::ValidationReport) data.
//!
//! ## Design
//!
//! - Both variants are fatal to the construction call that raised them.
//!   No partial object graph is ever returned.
//! - Shape mismatches carry the location of the offending value so a caller
//!   can point at the exact submission key.

use thiserror::Error;

use crate::path::ErrorPath;

/// Top-level error type for formgraph.
#[derive(Error, Debug)]
pub enum FormError {
    /// The input is not a plain key-value mapping, or is still wrapped in an
    /// unpermitted parameter container.
    #[error("input shape error: {0}")]
    InputShape(String),

    /// A value cannot be interpreted under the kind its field declares.
    #[error("schema mismatch at '{path}': expected {expected}, found {found}")]
    SchemaMismatch {
        /// Location of the offending value, relative to the root instance.
        path: ErrorPath,
        /// What the field's kind requires.
        expected: &'static str,
        /// JSON type name of the value that was supplied.
        found: &'static str,
    },
}

impl FormError {
    /// Shorthand for a [`FormError::SchemaMismatch`] built from the offending value.
    pub fn mismatch(path: ErrorPath, expected: &'static str, value: &serde_json::Value) -> Self {
        Self::SchemaMismatch {
            path,
            expected,
            found: json_type_name(value),
        }
    }
}

/// JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
