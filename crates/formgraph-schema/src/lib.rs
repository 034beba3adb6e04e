//! # formgraph-schema: Validation Engine & Schema Documents
//!
//! Connects formgraph field schemas to a real validation engine and to files
//! on disk.
//!
//! ## Validation Engine (`engine`)
//!
//! [`JsonSchemaEngine`] implements [`Validate`](formgraph_core::Validate) on
//! top of the `jsonschema` crate. A [`SchemaNode`](formgraph_core::SchemaNode)
//! is translated into a Draft 2020-12 JSON Schema, compiled once per schema
//! fingerprint, and run against instance data. Violations come back as
//! dotted error paths (`friends[0].name`) with form-friendly messages.
//!
//! ## Schema Documents (`document`)
//!
//! [`SchemaDocument`] loads field schemas from YAML or JSON: a root `fields`
//! table plus optional named `definitions` that fields reference with `ref`.
//!
//! ## Crate Policy
//!
//! - Depends only on `formgraph-core` internally.
//! - The engine never makes network requests; generated schemas are
//!   self-contained.

pub mod document;
pub mod engine;
pub mod error;

pub use document::SchemaDocument;
pub use engine::{to_json_schema, JsonSchemaEngine, Violation, PRESENCE_MESSAGE, REQUIRED_MESSAGE};
pub use error::SchemaError;
