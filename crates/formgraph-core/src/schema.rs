//! # Field Schemas
//!
//! A [`SchemaNode`] is an ordered set of named [`FieldSpec`]s. Each field is a
//! scalar of some primitive type, a nested object, or an array of nested
//! objects. Nested schemas are either anonymous (owned inline by the field)
//! or named (a definition shared between fields and forms).
//!
//! Schemas are immutable once built: the builder methods consume `self`, and
//! nested schemas are shared behind `Arc`.
//!
//! ## Rule flags
//!
//! `required` and `present` are carried through to the validation engine;
//! nothing in this workspace evaluates them outside the engine adapter.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint::SchemaFingerprint;
use crate::path::{ErrorPath, PathSegment};

/// Primitive type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// UTF-8 text.
    String,
    /// Whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Untyped; any JSON value.
    Any,
}

impl ScalarType {
    /// Returns the type identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A nested schema referenced by an object or array field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum ChildSchema {
    /// Defined inline; gets a fresh model type named after the field.
    Anonymous {
        /// The nested definition.
        schema: Arc<SchemaNode>,
    },
    /// A pre-supplied named definition; every reference resolves to the same model type.
    Named {
        /// Display name of the definition.
        name: String,
        /// The nested definition.
        schema: Arc<SchemaNode>,
    },
}

impl ChildSchema {
    /// An inline nested schema.
    pub fn anonymous(schema: impl Into<Arc<SchemaNode>>) -> Self {
        Self::Anonymous {
            schema: schema.into(),
        }
    }

    /// A named nested schema.
    pub fn named(name: impl Into<String>, schema: impl Into<Arc<SchemaNode>>) -> Self {
        Self::Named {
            name: name.into(),
            schema: schema.into(),
        }
    }

    /// The nested definition.
    pub fn schema(&self) -> &Arc<SchemaNode> {
        match self {
            Self::Anonymous { schema } | Self::Named { schema, .. } => schema,
        }
    }

    /// The definition's name, for named schemas.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Anonymous { .. } => None,
            Self::Named { name, .. } => Some(name),
        }
    }
}

/// What a field holds.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A primitive value stored as supplied.
    Scalar {
        /// Declared primitive type.
        #[serde(rename = "type")]
        scalar: ScalarType,
    },
    /// A single nested object.
    Object {
        /// The nested schema.
        child: ChildSchema,
    },
    /// An ordered sequence of nested objects sharing one schema.
    ArrayOfObject {
        /// The element schema.
        child: ChildSchema,
    },
}

impl FieldKind {
    /// The nested schema for object and array fields.
    pub fn child(&self) -> Option<&ChildSchema> {
        match self {
            Self::Scalar { .. } => None,
            Self::Object { child } | Self::ArrayOfObject { child } => Some(child),
        }
    }

    /// Short label used in diagnostics and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar { .. } => "scalar",
            Self::Object { .. } => "object",
            Self::ArrayOfObject { .. } => "array",
        }
    }
}

/// Rule flags handed through to the validation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRules {
    /// The key must be supplied.
    #[serde(default)]
    pub required: bool,
    /// The key must be supplied and its value must not be blank.
    #[serde(default)]
    pub present: bool,
}

/// A single named field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    name: String,
    #[serde(flatten)]
    kind: FieldKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<Value>,
    rules: FieldRules,
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
            rules: FieldRules::default(),
        }
    }

    /// A scalar field of the given primitive type.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::with_kind(name, FieldKind::Scalar { scalar })
    }

    /// A nested object field.
    pub fn object(name: impl Into<String>, child: ChildSchema) -> Self {
        Self::with_kind(name, FieldKind::Object { child })
    }

    /// An array-of-objects field.
    pub fn array(name: impl Into<String>, child: ChildSchema) -> Self {
        Self::with_kind(name, FieldKind::ArrayOfObject { child })
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.rules.required = true;
        self
    }

    /// Mark the field as required and non-blank.
    pub fn present(mut self) -> Self {
        self.rules.present = true;
        self
    }

    /// Restrict the field to an ordered list of allowed values.
    pub fn options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the rule flags wholesale.
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Allowed values, empty when unrestricted.
    pub fn allowed_values(&self) -> &[Value] {
        &self.options
    }

    /// Rule flags.
    pub fn rules(&self) -> FieldRules {
        self.rules
    }
}

/// An ordered mapping of field name to [`FieldSpec`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaNode {
    fields: Vec<FieldSpec>,
}

impl SchemaNode {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier field of the same name in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Structural digest of this schema.
    pub fn fingerprint(&self) -> SchemaFingerprint {
        SchemaFingerprint::of(self)
    }

    /// Resolve a path to the field it addresses.
    ///
    /// Index segments step into array elements; a trailing index resolves to
    /// the array field itself.
    pub fn resolve(&self, path: &ErrorPath) -> Option<&FieldSpec> {
        let mut node = self;
        let mut current: Option<&FieldSpec> = None;
        let last = path.len().saturating_sub(1);
        for (position, segment) in path.segments().iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if let Some(spec) = current {
                        node = match spec.kind() {
                            FieldKind::Object { child } => child.schema(),
                            _ => return None,
                        };
                    }
                    current = Some(node.get(name)?);
                }
                PathSegment::Index(_) => {
                    let spec = current?;
                    match spec.kind() {
                        FieldKind::ArrayOfObject { child } => node = child.schema(),
                        _ => return None,
                    }
                    if position == last {
                        return Some(spec);
                    }
                    // The element itself is not a field; the next field
                    // segment is looked up in the element schema.
                    current = None;
                }
            }
        }
        current
    }
}

impl FromIterator<FieldSpec> for SchemaNode {
    fn from_iter<T: IntoIterator<Item = FieldSpec>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), Self::field)
    }
}
