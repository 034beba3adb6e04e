//! # Model Factory
//!
//! Derives a [`ModelType`] from a [`SchemaNode`]: a fixed accessor table (one
//! [`FieldSlot`] per field), child wiring for nested fields, and the host-key
//! [`AliasTable`]. Derivation looks only at schema shape, never at data.
//!
//! ## Caching
//!
//! [`ModelFactory`] memoizes derivations keyed by `(fingerprint, name)`. The
//! cache sits behind a `parking_lot::RwLock`. Derivation runs without the
//! lock held, so two threads may derive the same type concurrently; the first
//! insert wins and both callers receive the cached `Arc`. Derivations are
//! behaviorally equivalent, so either result is correct.
//!
//! ## Child types
//!
//! - A named child definition is derived through the cache, so every field
//!   that references it, and every caller that derives it by name, shares one
//!   `Arc<ModelType>`.
//! - An anonymous child gets a fresh type named after its field (singular
//!   form for arrays). Fresh anonymous types match in shape, not identity.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use formgraph_core::inflect::{singularize, underscore};
use formgraph_core::{
    ChildSchema, FieldKind, FieldSpec, ScalarType, SchemaFingerprint, SchemaNode,
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::normalize::AliasTable;

/// How a field's value is stored in an instance.
#[derive(Debug, Clone)]
pub enum SlotBinding {
    /// Stored as supplied.
    Scalar(ScalarType),
    /// A child instance of the given type.
    Object(Arc<ModelType>),
    /// A sequence of child instances of the given type.
    Array(Arc<ModelType>),
}

impl SlotBinding {
    /// The child type for object and array fields.
    pub fn child(&self) -> Option<&Arc<ModelType>> {
        match self {
            Self::Scalar(_) => None,
            Self::Object(child) | Self::Array(child) => Some(child),
        }
    }
}

/// One accessor in a model type's field table.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    name: String,
    binding: SlotBinding,
}

impl FieldSlot {
    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the field is stored.
    pub fn binding(&self) -> &SlotBinding {
        &self.binding
    }
}

/// The derived runtime shape of one schema.
#[derive(Debug)]
pub struct ModelType {
    name: Option<String>,
    schema: Arc<SchemaNode>,
    fingerprint: SchemaFingerprint,
    slots: Vec<FieldSlot>,
    aliases: AliasTable,
}

impl ModelType {
    /// The display name, if one was given or derived.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The display name, or `"anonymous"`.
    pub fn model_name(&self) -> &str {
        self.name().unwrap_or("anonymous")
    }

    /// Key under which host form builders nest this model's fields.
    pub fn param_key(&self) -> String {
        singularize(&underscore(self.model_name()))
    }

    /// Label for a field in messages. Field names are shown as declared.
    pub fn human_attribute_name<'a>(&self, field: &'a str) -> &'a str {
        field
    }

    /// The schema this type was derived from.
    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// Structural digest of the schema.
    pub fn fingerprint(&self) -> SchemaFingerprint {
        self.fingerprint
    }

    /// The accessor table, in field declaration order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Look up an accessor by field name.
    pub fn slot(&self, field: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|s| s.name == field)
    }

    pub(crate) fn slot_index(&self, field: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == field)
    }

    /// Field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// The child type wired to an object or array field.
    pub fn child_type(&self, field: &str) -> Option<&Arc<ModelType>> {
        self.slot(field).and_then(|s| s.binding.child())
    }

    /// The host-key alias table for this level.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The field's declaration.
    pub fn field_spec(&self, field: &str) -> Option<&FieldSpec> {
        self.schema.get(field)
    }

    /// Allowed values declared for a field; empty when none are declared.
    pub fn options_for(&self, field: &str) -> &[Value] {
        self.field_spec(field)
            .map(FieldSpec::allowed_values)
            .unwrap_or(&[])
    }

    /// A reference to this type usable as a nested schema in another form.
    ///
    /// Named types are resolved back to this exact type by the factory that
    /// produced them. Identity does not cross factories: another factory
    /// derives its own equivalent type under the same name. Use the same
    /// factory (or [`ModelFactory::global`]) on both sides to share one `Arc`.
    /// Unnamed types are referenced anonymously.
    pub fn as_child(&self) -> ChildSchema {
        match &self.name {
            Some(name) => ChildSchema::named(name.clone(), Arc::clone(&self.schema)),
            None => ChildSchema::anonymous(Arc::clone(&self.schema)),
        }
    }

    /// A comparable description of field set and child wiring.
    pub fn shape(&self) -> TypeShape {
        TypeShape {
            name: self.name.clone(),
            fingerprint: self.fingerprint.to_hex(),
            fields: self
                .slots
                .iter()
                .map(|slot| {
                    let (kind, scalar, child) = match &slot.binding {
                        SlotBinding::Scalar(t) => ("scalar", Some(*t), None),
                        SlotBinding::Object(c) => ("object", None, Some(Box::new(c.shape()))),
                        SlotBinding::Array(c) => ("array", None, Some(Box::new(c.shape()))),
                    };
                    ShapeField {
                        name: slot.name.clone(),
                        kind,
                        scalar,
                        child,
                    }
                })
                .collect(),
        }
    }

    /// True if both types have the same field set and child wiring.
    pub fn is_equivalent(&self, other: &ModelType) -> bool {
        self.shape() == other.shape()
    }
}

/// Structural description of a [`ModelType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeShape {
    /// Display name.
    pub name: Option<String>,
    /// Hex schema fingerprint.
    pub fingerprint: String,
    /// Fields in declaration order.
    pub fields: Vec<ShapeField>,
}

/// One field of a [`TypeShape`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeField {
    /// Field name.
    pub name: String,
    /// `scalar`, `object` or `array`.
    pub kind: &'static str,
    /// Primitive type for scalars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarType>,
    /// Child shape for nested fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<TypeShape>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    fingerprint: SchemaFingerprint,
    name: Option<String>,
}

/// Derives and caches model types.
#[derive(Debug, Default)]
pub struct ModelFactory {
    cache: RwLock<HashMap<TypeKey, Arc<ModelType>>>,
}

impl ModelFactory {
    /// A factory with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide factory.
    pub fn global() -> &'static ModelFactory {
        static GLOBAL: OnceLock<ModelFactory> = OnceLock::new();
        GLOBAL.get_or_init(ModelFactory::new)
    }

    /// Derive (or fetch the cached) model type for a schema and display name.
    pub fn derive_type(
        &self,
        schema: impl Into<Arc<SchemaNode>>,
        name: Option<&str>,
    ) -> Arc<ModelType> {
        let schema = schema.into();
        let key = TypeKey {
            fingerprint: schema.fingerprint(),
            name: name.map(str::to_string),
        };

        if let Some(cached) = self.cache.read().get(&key) {
            tracing::trace!(
                model = cached.model_name(),
                fingerprint = %key.fingerprint.short(),
                "model type cache hit"
            );
            return Arc::clone(cached);
        }

        let derived = Arc::new(self.assemble(schema, key.name.clone(), key.fingerprint));
        tracing::debug!(
            model = derived.model_name(),
            fingerprint = %key.fingerprint.short(),
            fields = derived.slots.len(),
            "derived model type"
        );
        Arc::clone(self.cache.write().entry(key).or_insert(derived))
    }

    /// Derive the child type for an object or array field.
    ///
    /// Named child definitions go through the cache and ignore
    /// `suggested_name`; anonymous ones get a fresh type carrying it.
    /// Returns `None` for scalar fields.
    pub fn build_child_type_for(
        &self,
        field: &FieldSpec,
        suggested_name: &str,
    ) -> Option<Arc<ModelType>> {
        field
            .kind()
            .child()
            .map(|child| self.child_type(child, suggested_name))
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Drop every cached type. Existing `Arc`s stay valid.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    fn child_type(&self, child: &ChildSchema, suggested_name: &str) -> Arc<ModelType> {
        match child {
            ChildSchema::Named { name, schema } => self.derive_type(Arc::clone(schema), Some(name)),
            ChildSchema::Anonymous { schema } => Arc::new(self.assemble(
                Arc::clone(schema),
                Some(suggested_name.to_string()),
                schema.fingerprint(),
            )),
        }
    }

    fn assemble(
        &self,
        schema: Arc<SchemaNode>,
        name: Option<String>,
        fingerprint: SchemaFingerprint,
    ) -> ModelType {
        let slots = schema
            .fields()
            .iter()
            .map(|field| {
                let binding = match field.kind() {
                    FieldKind::Scalar { scalar } => SlotBinding::Scalar(*scalar),
                    FieldKind::Object { child } => {
                        SlotBinding::Object(self.child_type(child, field.name()))
                    }
                    FieldKind::ArrayOfObject { child } => {
                        SlotBinding::Array(self.child_type(child, &singularize(field.name())))
                    }
                };
                FieldSlot {
                    name: field.name().to_string(),
                    binding,
                }
            })
            .collect();

        ModelType {
            aliases: AliasTable::for_schema(&schema),
            name,
            schema,
            fingerprint,
            slots,
        }
    }
}
