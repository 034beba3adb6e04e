//! # JSON Schema Engine
//!
//! Runtime validation of instance data against a [`SchemaNode`], by way of
//! the `jsonschema` crate (Draft 2020-12).
//!
//! ## Translation
//!
//! | field                    | JSON Schema                                    |
//! |--------------------------|------------------------------------------------|
//! | scalar `string`          | `{"type": ["string", "null"]}`                 |
//! | scalar `any`             | `{}`                                           |
//! | object                   | `{"type": ["object", "null"], "properties"…}`  |
//! | array of objects         | `{"type": ["array", "null"], "items": {…}}`    |
//! | `required`               | listed in the parent's `required`              |
//! | `present`                | required, not nullable, strings `minLength: 1` |
//! | options                  | `enum` (plus `null` unless `present`)          |
//!
//! Undeclared keys are allowed; input sanitization is not this engine's job.
//!
//! ## Messages
//!
//! - a missing or blank `present` field → [`PRESENCE_MESSAGE`]
//! - a missing `required` field → [`REQUIRED_MESSAGE`]
//! - a value outside its options → `must be one of: a, b`
//! - a scalar of the wrong type → `must be of type <type>`
//! - anything else → the engine's own message
//!
//! Compiled validators are cached per schema fingerprint.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formgraph_core::{
    ErrorEntry, ErrorPath, FieldKind, FieldSpec, ScalarType, SchemaFingerprint, SchemaNode,
    Validate, ValidationReport,
};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Message for a missing or blank `present` field.
pub const PRESENCE_MESSAGE: &str = "is required and value must be present";

/// Message for a missing `required` field.
pub const REQUIRED_MESSAGE: &str = "is required";

/// A single violation with the engine's own context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the violating value.
    pub path: ErrorPath,
    /// JSON Pointer into the generated schema that triggered the violation.
    pub schema_path: String,
    /// Form-friendly message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// Translate a field schema into a Draft 2020-12 JSON Schema.
pub fn to_json_schema(schema: &SchemaNode) -> Value {
    let mut root = object_schema(schema);
    if let Value::Object(map) = &mut root {
        map.insert(
            "$schema".into(),
            json!("https://json-schema.org/draft/2020-12/schema"),
        );
    }
    root
}

fn object_schema(schema: &SchemaNode) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        let rules = field.rules();
        if rules.required || rules.present {
            required.push(json!(field.name()));
        }
        properties.insert(field.name().to_string(), field_schema(field));
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(field: &FieldSpec) -> Value {
    let present = field.rules().present;
    let mut schema = match field.kind() {
        FieldKind::Scalar { scalar } => scalar_schema(*scalar, present),
        FieldKind::Object { child } => object_schema(child.schema()),
        FieldKind::ArrayOfObject { child } => json!({
            "type": "array",
            "items": object_schema(child.schema()),
        }),
    };

    let Value::Object(map) = &mut schema else {
        return schema;
    };
    if !present {
        if let Some(Value::String(t)) = map.get("type") {
            let nullable = json!([t.clone(), "null"]);
            map.insert("type".into(), nullable);
        }
    }
    if !field.allowed_values().is_empty() {
        let mut allowed = field.allowed_values().to_vec();
        if !present {
            allowed.push(Value::Null);
        }
        map.insert("enum".into(), Value::Array(allowed));
    }
    schema
}

fn scalar_schema(scalar: ScalarType, present: bool) -> Value {
    match scalar {
        ScalarType::String if present => json!({"type": "string", "minLength": 1}),
        ScalarType::Any if present => json!({"not": {"type": "null"}}),
        ScalarType::Any => json!({}),
        other => json!({"type": other.as_str()}),
    }
}

/// A [`Validate`] implementation backed by `jsonschema`.
#[derive(Default)]
pub struct JsonSchemaEngine {
    compiled: RwLock<HashMap<SchemaFingerprint, Arc<Validator>>>,
}

impl fmt::Debug for JsonSchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaEngine")
            .field("compiled", &self.compiled.read().len())
            .finish()
    }
}

impl JsonSchemaEngine {
    /// An engine with an empty validator cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile (or fetch the cached) validator for a schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuild` if the generated JSON Schema
    /// cannot be compiled.
    pub fn build_validator(&self, schema: &SchemaNode) -> Result<Arc<Validator>, SchemaError> {
        let fingerprint = schema.fingerprint();
        if let Some(validator) = self.compiled.read().get(&fingerprint) {
            return Ok(Arc::clone(validator));
        }

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&to_json_schema(schema))
            .map_err(|e| SchemaError::ValidatorBuild {
                schema: fingerprint.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(fingerprint = %fingerprint.short(), "compiled validator");

        let validator = Arc::new(validator);
        Ok(Arc::clone(
            self.compiled
                .write()
                .entry(fingerprint)
                .or_insert(validator),
        ))
    }

    /// Validate `data` and return every violation with engine context.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuild` if the schema cannot be compiled.
    pub fn violations(&self, schema: &SchemaNode, data: &Value) -> Result<Vec<Violation>, SchemaError> {
        let validator = self.build_validator(schema)?;
        let violations: Vec<Violation> = validator
            .iter_errors(data)
            .map(|e| translate(schema, &e))
            .collect();
        tracing::debug!(violations = violations.len(), "validated document");
        Ok(violations)
    }

    /// Number of compiled validators held.
    pub fn compiled_count(&self) -> usize {
        self.compiled.read().len()
    }
}

impl Validate for JsonSchemaEngine {
    type Error = SchemaError;

    fn validate(&self, schema: &SchemaNode, data: &Value) -> Result<ValidationReport, SchemaError> {
        Ok(self
            .violations(schema, data)?
            .into_iter()
            .map(|v| ErrorEntry {
                path: v.path,
                message: v.message,
            })
            .collect())
    }
}

fn translate(schema: &SchemaNode, error: &ValidationError<'_>) -> Violation {
    let location = ErrorPath::from_json_pointer(&error.instance_path.to_string());
    let schema_path = error.schema_path.to_string();

    let (path, message) = match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            let path = location.child(&name);
            let message = match schema.resolve(&path) {
                Some(field) if field.rules().present => PRESENCE_MESSAGE.to_string(),
                _ => REQUIRED_MESSAGE.to_string(),
            };
            (path, message)
        }
        ValidationErrorKind::MinLength { .. } if is_present_field(schema, &location) => {
            (location, PRESENCE_MESSAGE.to_string())
        }
        ValidationErrorKind::Type { .. } if error.instance.is_null() => {
            let message = if is_present_field(schema, &location) {
                PRESENCE_MESSAGE.to_string()
            } else {
                error.to_string()
            };
            (location, message)
        }
        ValidationErrorKind::Type { .. } => {
            let message = match schema.resolve(&location).map(FieldSpec::kind) {
                Some(FieldKind::Scalar { scalar }) => format!("must be of type {scalar}"),
                _ => error.to_string(),
            };
            (location, message)
        }
        ValidationErrorKind::Enum { .. } => {
            let message = match schema.resolve(&location) {
                Some(field) => format!("must be one of: {}", render_options(field.allowed_values())),
                None => error.to_string(),
            };
            (location, message)
        }
        ValidationErrorKind::Not { .. } if error.instance.is_null() => {
            (location, PRESENCE_MESSAGE.to_string())
        }
        _ => {
            let message = error.to_string();
            (location, message)
        }
    };

    Violation {
        path,
        schema_path,
        message,
    }
}

fn is_present_field(schema: &SchemaNode, path: &ErrorPath) -> bool {
    schema
        .resolve(path)
        .is_some_and(|field| field.rules().present)
}

fn render_options(options: &[Value]) -> String {
    options
        .iter()
        .map(|o| match o {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
