//! # formgraph-core: Foundational Types for formgraph
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: the declarative field schema, the locator strings a validation
//! engine emits, and the boundary trait such an engine implements.
//!
//! ## Key Design Principles
//!
//! 1. **Schemas are immutable values.** A [`SchemaNode`] is built once and
//!    shared behind `Arc`. Nested schemas are either anonymous (derived per
//!    parent) or named (reused wherever they are referenced).
//!
//! 2. **Structural identity.** [`SchemaFingerprint`] is a SHA-256 digest over
//!    the shape of a schema. Two identical definitions share a fingerprint,
//!    which is what the model-type cache keys on.
//!
//! 3. **Validation is data, not failure.** The engine boundary ([`Validate`])
//!    returns a [`ValidationReport`]: an ordered list of `(path, message)`
//!    entries. Only malformed input is an error ([`FormError`]).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formgraph-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod fingerprint;
pub mod inflect;
pub mod path;
pub mod report;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use error::FormError;
pub use fingerprint::SchemaFingerprint;
pub use path::{ErrorPath, PathSegment};
pub use report::{ErrorEntry, Validate, ValidationReport};
pub use schema::{ChildSchema, FieldKind, FieldRules, FieldSpec, ScalarType, SchemaNode};
