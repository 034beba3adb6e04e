//! # formgraph-model: Schema-Driven Object Graphs
//!
//! Projects a [`SchemaNode`](formgraph_core::SchemaNode) onto submitted data,
//! producing a tree of [`ModelInstance`]s that form-rendering code can read
//! field by field, validate, and query for errors one level at a time.
//!
//! ## Pipeline
//!
//! ```text
//! raw input ─▶ Params unwrap ─▶ normalize ─▶ ModelFactory ─▶ ModelInstance
//!                                                                 │
//!                               ValidationReport (engine) ◀───────┘
//!                                        │
//!                                        ▼
//!                               errors_for(instance)
//! ```
//!
//! - [`normalize`] rewrites host-framework submission keys
//!   (`friends_attributes`, `account_attributes`) into canonical field names.
//! - [`ModelFactory`] derives one [`ModelType`] per schema and caches it.
//! - [`ModelInstance::construct`] builds the whole tree eagerly.
//! - [`errors_for`] scopes a tree-wide report to one instance's own fields.
//!
//! ## Crate Policy
//!
//! - The factory cache is the only shared mutable state.
//! - Instances are immutable after construction; build a new one to change data.

pub mod aggregate;
pub mod factory;
pub mod instance;
pub mod normalize;
pub mod params;

pub use aggregate::{errors_for, FieldErrors, BASE_KEY};
pub use factory::{FieldSlot, ModelFactory, ModelType, ShapeField, SlotBinding, TypeShape};
pub use instance::{FieldValue, ModelInstance, Walk};
pub use normalize::{normalize, Alias, AliasTable, ATTRIBUTES_SUFFIX};
pub use params::{FormInput, Params};
