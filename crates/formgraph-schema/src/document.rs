//! # Schema Documents
//!
//! Field schemas written as YAML or JSON:
//!
//! ```yaml
//! name: user
//! definitions:
//!   friend:
//!     name: { type: string, present: true }
//!     age: { type: integer }
//! fields:
//!   name: { type: string, present: true }
//!   role: { type: string, options: [admin, member] }
//!   friends: { type: array, ref: friend }
//!   account:
//!     type: object
//!     schema:
//!       name: { type: string }
//! ```
//!
//! A field of type `object` or `array` takes its child schema from exactly
//! one of `ref` (a named definition, which keeps a stable type identity) or
//! `schema` (an inline, anonymous fields table). Definitions may reference
//! each other but not cyclically. Field order follows the document.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use formgraph_core::{ChildSchema, FieldRules, FieldSpec, ScalarType, SchemaNode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;

const INLINE_LABEL: &str = "<inline>";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    definitions: Map<String, Value>,
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    #[serde(rename = "type")]
    kind: RawKind,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    schema: Option<Map<String, Value>>,
    #[serde(default)]
    options: Vec<Value>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    present: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    String,
    Integer,
    Number,
    Boolean,
    Any,
    Object,
    Array,
}

impl RawKind {
    fn scalar(self) -> Option<ScalarType> {
        match self {
            Self::String => Some(ScalarType::String),
            Self::Integer => Some(ScalarType::Integer),
            Self::Number => Some(ScalarType::Number),
            Self::Boolean => Some(ScalarType::Boolean),
            Self::Any => Some(ScalarType::Any),
            Self::Object | Self::Array => None,
        }
    }
}

/// A loaded schema document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    name: Option<String>,
    root: Arc<SchemaNode>,
    definitions: Vec<(String, Arc<SchemaNode>)>,
}

impl SchemaDocument {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        parse_yaml(content, INLINE_LABEL)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        parse_json(content, INLINE_LABEL)
    }

    /// Build a document from an already-parsed value.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        from_value_labeled(value, INLINE_LABEL)
    }

    /// Load a document from disk.
    ///
    /// The format is chosen by extension: `.yaml`/`.yml` for YAML, anything
    /// else for JSON.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let label = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
            path: label.clone(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let document = match ext {
            "yaml" | "yml" => parse_yaml(&content, &label)?,
            _ => parse_json(&content, &label)?,
        };
        tracing::debug!(
            path = %label,
            fields = document.root.len(),
            definitions = document.definitions.len(),
            "loaded schema document"
        );
        Ok(document)
    }

    /// The document's declared name, used as the root type's display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The root field schema.
    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    /// Look up a named definition.
    pub fn definition(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        self.definitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, schema)| schema)
    }

    /// Named definitions in document order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &Arc<SchemaNode>)> {
        self.definitions.iter().map(|(n, s)| (n.as_str(), s))
    }
}

fn parse_yaml(content: &str, label: &str) -> Result<SchemaDocument, SchemaError> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| SchemaError::DocumentLoad {
        path: label.to_string(),
        reason: format!("invalid YAML: {e}"),
    })?;
    from_value_labeled(value, label)
}

fn parse_json(content: &str, label: &str) -> Result<SchemaDocument, SchemaError> {
    let value = serde_json::from_str(content).map_err(|e| SchemaError::DocumentLoad {
        path: label.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    from_value_labeled(value, label)
}

fn from_value_labeled(value: Value, label: &str) -> Result<SchemaDocument, SchemaError> {
    let raw: RawDocument = serde_json::from_value(value).map_err(|e| SchemaError::DocumentLoad {
        path: label.to_string(),
        reason: e.to_string(),
    })?;

    let mut resolver = Resolver {
        raw: &raw.definitions,
        resolved: HashMap::new(),
        in_progress: Vec::new(),
    };
    let mut definitions = Vec::with_capacity(raw.definitions.len());
    for name in raw.definitions.keys() {
        definitions.push((name.clone(), resolver.definition(name, name)?));
    }
    let root = Arc::new(resolver.fields(&raw.fields, "")?);

    Ok(SchemaDocument {
        name: raw.name,
        root,
        definitions,
    })
}

struct Resolver<'a> {
    raw: &'a Map<String, Value>,
    resolved: HashMap<String, Arc<SchemaNode>>,
    in_progress: Vec<String>,
}

impl Resolver<'_> {
    fn definition(&mut self, name: &str, referrer: &str) -> Result<Arc<SchemaNode>, SchemaError> {
        if let Some(schema) = self.resolved.get(name) {
            return Ok(Arc::clone(schema));
        }
        if self.in_progress.iter().any(|n| n == name) {
            let mut chain = self.in_progress.clone();
            chain.push(name.to_string());
            return Err(SchemaError::InvalidDefinition {
                name: name.to_string(),
                reason: format!("cyclic reference: {}", chain.join(" -> ")),
            });
        }
        let raw = self.raw;
        let table = match raw.get(name) {
            Some(Value::Object(table)) => table,
            Some(other) => {
                return Err(SchemaError::InvalidDefinition {
                    name: name.to_string(),
                    reason: format!("expected a fields table, found {other}"),
                })
            }
            None => {
                return Err(SchemaError::UnknownReference {
                    field: referrer.to_string(),
                    reference: name.to_string(),
                })
            }
        };

        self.in_progress.push(name.to_string());
        let schema = self.fields(table, name);
        self.in_progress.pop();

        let schema = Arc::new(schema?);
        self.resolved.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    fn fields(&mut self, table: &Map<String, Value>, scope: &str) -> Result<SchemaNode, SchemaError> {
        let mut node = SchemaNode::new();
        for (field_name, value) in table {
            let dotted = if scope.is_empty() {
                field_name.clone()
            } else {
                format!("{scope}.{field_name}")
            };
            if field_name.is_empty() {
                return Err(SchemaError::InvalidDefinition {
                    name: dotted,
                    reason: "field names must not be empty".into(),
                });
            }
            let raw: RawField =
                serde_json::from_value(value.clone()).map_err(|e| SchemaError::InvalidDefinition {
                    name: dotted.clone(),
                    reason: e.to_string(),
                })?;
            node = node.field(self.field(field_name, raw, &dotted)?);
        }
        Ok(node)
    }

    fn field(&mut self, name: &str, raw: RawField, dotted: &str) -> Result<FieldSpec, SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidDefinition {
            name: dotted.to_string(),
            reason: reason.to_string(),
        };
        let rules = FieldRules {
            required: raw.required,
            present: raw.present,
        };

        let spec = match raw.kind.scalar() {
            Some(scalar) => {
                if raw.reference.is_some() || raw.schema.is_some() {
                    return Err(invalid("scalar fields take no child schema"));
                }
                FieldSpec::scalar(name, scalar).options(raw.options)
            }
            None => {
                if !raw.options.is_empty() {
                    return Err(invalid("options apply to scalar fields only"));
                }
                let child = match (raw.reference, raw.schema) {
                    (Some(reference), None) => {
                        ChildSchema::named(reference.clone(), self.definition(&reference, dotted)?)
                    }
                    (None, Some(table)) => ChildSchema::anonymous(self.fields(&table, dotted)?),
                    (Some(_), Some(_)) => return Err(invalid("give either 'ref' or 'schema', not both")),
                    (None, None) => return Err(invalid("nested fields need 'ref' or 'schema'")),
                };
                match raw.kind {
                    RawKind::Array => FieldSpec::array(name, child),
                    _ => FieldSpec::object(name, child),
                }
            }
        };
        Ok(spec.with_rules(rules))
    }
}
