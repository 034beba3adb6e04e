//! # Model Instances
//!
//! A [`ModelInstance`] is one [`ModelType`] bound to one submission. The
//! whole tree is built eagerly by [`ModelInstance::construct`]:
//!
//! 1. the input is unwrapped and normalized once, from the root: object
//!    submappings are normalized along with their parent, array elements
//!    when their element instance is built;
//! 2. scalar values are stored as supplied, with no coercion;
//! 3. object fields become child instances, or [`FieldValue::Absent`] when
//!    missing or null;
//! 4. array fields become sequences of child instances. A missing or null
//!    array reads as empty but is recorded as [`FieldValue::Omitted`], so
//!    [`ModelInstance::to_value`] leaves it out and `required` still fires.
//!
//! Children are built depth-first, in field declaration order, then in array
//! index order. A `trace` event is emitted as each instance begins
//! construction, so log output follows that order. [`ModelInstance::walk`]
//! visits the finished tree in the same order.
//!
//! Any value that cannot be read under its field's kind aborts the whole
//! construction with `FormError::SchemaMismatch`.

use std::sync::Arc;

use formgraph_core::{ErrorPath, FormError, Validate, ValidationReport};
use serde_json::{Map, Value};

use crate::factory::{ModelType, SlotBinding};
use crate::normalize::{into_elements, normalize};
use crate::params::{FormInput, Params};

/// The stored value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value: a missing scalar, or a missing/null object.
    Absent,
    /// A scalar value, exactly as supplied.
    Scalar(Value),
    /// A nested object.
    Object(Box<ModelInstance>),
    /// A sequence of nested objects.
    Array(Vec<ModelInstance>),
    /// An array field missing from the submission or null; reads as empty.
    Omitted,
}

impl FieldValue {
    /// Returns true for [`FieldValue::Absent`] and [`FieldValue::Omitted`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent | Self::Omitted)
    }

    /// The scalar value, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The child instance, if this is a present object.
    pub fn as_object(&self) -> Option<&ModelInstance> {
        match self {
            Self::Object(child) => Some(child),
            _ => None,
        }
    }

    /// The child instances; empty for anything but an array.
    pub fn as_array(&self) -> &[ModelInstance] {
        match self {
            Self::Array(items) => items,
            _ => &[],
        }
    }

    fn to_value(&self) -> Option<Value> {
        match self {
            Self::Absent | Self::Omitted => None,
            Self::Scalar(v) => Some(v.clone()),
            Self::Object(child) => Some(child.to_value()),
            Self::Array(items) => Some(Value::Array(items.iter().map(ModelInstance::to_value).collect())),
        }
    }
}

/// One constructed object in the graph.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    model: Arc<ModelType>,
    location: ErrorPath,
    values: Vec<FieldValue>,
}

impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
            && self.location == other.location
            && self.values == other.values
    }
}

impl ModelInstance {
    /// Build the full instance tree for `model` from `input`.
    ///
    /// # Errors
    ///
    /// - `FormError::InputShape` if the input is not a mapping or is an
    ///   unpermitted [`Params`] container.
    /// - `FormError::SchemaMismatch` if a nested value does not fit its field.
    pub fn construct(model: &Arc<ModelType>, input: impl Into<FormInput>) -> Result<Self, FormError> {
        let mapping = input.into().into_mapping()?;
        Self::build(model, ErrorPath::root(), normalize(mapping, model))
    }

    /// Build from a host parameter container, permitting every key first.
    ///
    /// # Errors
    ///
    /// Same as [`ModelInstance::construct`].
    pub fn from_params(model: &Arc<ModelType>, params: Params) -> Result<Self, FormError> {
        Self::construct(model, params.permit_all())
    }

    /// `data` must already be normalized for `model`.
    fn build(
        model: &Arc<ModelType>,
        location: ErrorPath,
        mut data: Map<String, Value>,
    ) -> Result<Self, FormError> {
        tracing::trace!(model = model.model_name(), location = %location, "constructing instance");

        let mut values = Vec::with_capacity(model.slots().len());

        for slot in model.slots() {
            let supplied = data.remove(slot.name());
            let value = match slot.binding() {
                SlotBinding::Scalar(_) => supplied.map_or(FieldValue::Absent, FieldValue::Scalar),
                SlotBinding::Object(child) => match supplied {
                    None | Some(Value::Null) => FieldValue::Absent,
                    Some(Value::Object(sub)) => FieldValue::Object(Box::new(Self::build(
                        child,
                        location.child(slot.name()),
                        sub,
                    )?)),
                    Some(other) => {
                        return Err(FormError::mismatch(location.child(slot.name()), "object", &other))
                    }
                },
                SlotBinding::Array(child) => match supplied {
                    None | Some(Value::Null) => FieldValue::Omitted,
                    Some(value) => {
                        let field_location = location.child(slot.name());
                        let elements = into_elements(value).map_err(|other| {
                            FormError::mismatch(field_location.clone(), "array", &other)
                        })?;
                        let mut items = Vec::with_capacity(elements.len());
                        for (index, element) in elements.into_iter().enumerate() {
                            let element_location = field_location.index(index);
                            match element {
                                Value::Object(sub) => items.push(Self::build(
                                    child,
                                    element_location,
                                    normalize(sub, child),
                                )?),
                                other => {
                                    return Err(FormError::mismatch(element_location, "object", &other))
                                }
                            }
                        }
                        FieldValue::Array(items)
                    }
                },
            };
            values.push(value);
        }

        Ok(Self {
            model: Arc::clone(model),
            location,
            values,
        })
    }

    /// The instance's model type.
    pub fn model(&self) -> &Arc<ModelType> {
        &self.model
    }

    /// Where this instance sits in the tree; root for the top-level instance.
    pub fn location(&self) -> &ErrorPath {
        &self.location
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.model.slot_index(field).map(|i| &self.values[i])
    }

    /// Read a scalar field. `None` if absent, unknown, or not a scalar.
    pub fn scalar(&self, field: &str) -> Option<&Value> {
        self.get(field).and_then(FieldValue::as_scalar)
    }

    /// Read an object field. `None` if absent, unknown, or not an object.
    pub fn object(&self, field: &str) -> Option<&ModelInstance> {
        self.get(field).and_then(FieldValue::as_object)
    }

    /// Read an array field. Empty if unknown or not an array.
    pub fn array(&self, field: &str) -> &[ModelInstance] {
        self.get(field).map(FieldValue::as_array).unwrap_or(&[])
    }

    /// Every field with its stored value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.model.field_names().zip(self.values.iter())
    }

    /// Allowed values declared for a field; empty when none are declared.
    pub fn options_for(&self, field: &str) -> &[Value] {
        self.model.options_for(field)
    }

    /// Rebuild the canonical mapping this instance holds.
    ///
    /// Absent fields and omitted arrays are left out; a supplied array is
    /// emitted even when empty.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.values.len());
        for (name, value) in self.fields() {
            if let Some(v) = value.to_value() {
                map.insert(name.to_string(), v);
            }
        }
        Value::Object(map)
    }

    /// Visit this instance and all descendants in construction order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Run a validation engine over this instance's data.
    ///
    /// The returned report is root-relative: paths are rebased onto this
    /// instance's location, so it can be handed to [`errors_for`](crate::errors_for)
    /// for this instance or any of its descendants.
    ///
    /// # Errors
    ///
    /// Propagates the engine's own failure to run.
    pub fn validate<V: Validate>(&self, engine: &V) -> Result<ValidationReport, V::Error> {
        let report = engine.validate(self.model.schema(), &self.to_value())?;
        tracing::debug!(
            model = self.model.model_name(),
            location = %self.location,
            violations = report.len(),
            "validated instance"
        );
        Ok(report.rebased(&self.location))
    }

    /// True when no entry in `report` addresses this instance or anything beneath it.
    pub fn is_valid_in(&self, report: &ValidationReport) -> bool {
        report.beneath(&self.location).next().is_none()
    }
}

/// Depth-first iterator over an instance tree. See [`ModelInstance::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a ModelInstance>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ModelInstance;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        for value in current.values.iter().rev() {
            match value {
                FieldValue::Object(child) => self.stack.push(child),
                FieldValue::Array(items) => self.stack.extend(items.iter().rev()),
                FieldValue::Absent | FieldValue::Omitted | FieldValue::Scalar(_) => {}
            }
        }
        Some(current)
    }
}
