//! # Constructor Input
//!
//! Instances are built from a plain key→value mapping. Host frameworks often
//! hand over submissions wrapped in an access-control container instead;
//! [`Params`] models that container. Its contents are readable, but it only
//! yields a mapping once it has been authorized with [`Params::permit_all`].

use formgraph_core::error::json_type_name;
use formgraph_core::FormError;
use serde_json::{Map, Value};

/// A submission wrapped in an access-control container.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    inner: Value,
    permitted: bool,
}

impl Params {
    /// Wrap a submission. The container starts unpermitted.
    pub fn new(inner: Value) -> Self {
        Self {
            inner,
            permitted: false,
        }
    }

    /// Authorize every key.
    pub fn permit_all(mut self) -> Self {
        self.permitted = true;
        self
    }

    /// Whether the container has been authorized.
    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    /// Read a top-level value without unwrapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Unwrap into a plain mapping.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InputShape` if the container is unpermitted or
    /// does not hold a mapping.
    pub fn into_mapping(self) -> Result<Map<String, Value>, FormError> {
        if !self.permitted {
            return Err(FormError::InputShape(
                "parameters must be permitted before use".into(),
            ));
        }
        expect_mapping(self.inner)
    }
}

/// Anything an instance can be constructed from.
#[derive(Debug, Clone, PartialEq)]
pub enum FormInput {
    /// A plain value; must be a mapping.
    Mapping(Value),
    /// A parameter container; must be permitted.
    Params(Params),
}

impl FormInput {
    /// Unwrap into a plain mapping.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InputShape` for non-mapping values and
    /// unpermitted containers.
    pub fn into_mapping(self) -> Result<Map<String, Value>, FormError> {
        match self {
            Self::Mapping(value) => expect_mapping(value),
            Self::Params(params) => params.into_mapping(),
        }
    }
}

fn expect_mapping(value: Value) -> Result<Map<String, Value>, FormError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FormError::InputShape(format!(
            "expected a mapping, found {}",
            json_type_name(&other)
        ))),
    }
}

impl From<Value> for FormInput {
    fn from(value: Value) -> Self {
        Self::Mapping(value)
    }
}

impl From<Map<String, Value>> for FormInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(Value::Object(map))
    }
}

impl From<Params> for FormInput {
    fn from(params: Params) -> Self {
        Self::Params(params)
    }
}
