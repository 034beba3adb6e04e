//! Errors raised while loading schema documents or compiling validators.

use thiserror::Error;

/// Error loading a schema document or running the engine.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path or label of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A field or definition is malformed.
    #[error("invalid definition '{name}': {reason}")]
    InvalidDefinition {
        /// Dotted name of the offending field or definition.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A field references a definition that does not exist.
    #[error("field '{field}' references unknown definition '{reference}'")]
    UnknownReference {
        /// Dotted name of the referencing field.
        field: String,
        /// The missing definition name.
        reference: String,
    },

    /// The generated JSON Schema could not be compiled.
    #[error("validator build error for schema {schema}: {reason}")]
    ValidatorBuild {
        /// Fingerprint of the schema.
        schema: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
