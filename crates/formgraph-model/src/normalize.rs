//! # Key Normalization
//!
//! Host form builders submit nested data under aliased keys:
//!
//! - array fields as `<plural>_attributes`, with an index→object mapping
//!   (`{"0": {...}, "1": {...}}`) instead of a sequence;
//! - object fields as `<field>_attributes`, value unchanged.
//!
//! [`normalize`] rewrites those keys to canonical field names and converts
//! index mappings into ordered sequences. Every level uses the alias table of
//! its own [`ModelType`]; array elements are left for the element type to
//! normalize when it constructs them.
//!
//! Normalization never fails. Keys that match no alias pass through.

use std::collections::BTreeMap;

use formgraph_core::inflect::pluralize;
use formgraph_core::{FieldKind, SchemaNode};
use serde_json::{Map, Value};

use crate::factory::{ModelType, SlotBinding};

/// Suffix host form builders append to nested-attribute keys.
pub const ATTRIBUTES_SUFFIX: &str = "_attributes";

/// Which canonical field an alias stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias<'a> {
    /// Alias of an array field; the value is an index mapping.
    Array(&'a str),
    /// Alias of an object field; the value is used unchanged.
    Object(&'a str),
}

/// Host-key aliases for one model type, computed once from its own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    arrays: BTreeMap<String, String>,
    objects: BTreeMap<String, String>,
}

impl AliasTable {
    /// Build the alias table for a schema.
    ///
    /// An alias that collides with a declared field name is not registered;
    /// canonical keys always win.
    pub fn for_schema(schema: &SchemaNode) -> Self {
        let mut table = Self::default();
        for field in schema.fields() {
            let (alias, target) = match field.kind() {
                FieldKind::ArrayOfObject { .. } => (
                    format!("{}{ATTRIBUTES_SUFFIX}", pluralize(field.name())),
                    &mut table.arrays,
                ),
                FieldKind::Object { .. } => (
                    format!("{}{ATTRIBUTES_SUFFIX}", field.name()),
                    &mut table.objects,
                ),
                FieldKind::Scalar { .. } => continue,
            };
            if schema.get(&alias).is_none() {
                target.insert(alias, field.name().to_string());
            }
        }
        table
    }

    /// Look up a submission key.
    pub fn resolve(&self, key: &str) -> Option<Alias<'_>> {
        if let Some(field) = self.arrays.get(key) {
            return Some(Alias::Array(field));
        }
        self.objects.get(key).map(|field| Alias::Object(field))
    }

    /// Array aliases as `(alias, field)` pairs, sorted by alias.
    pub fn arrays(&self) -> impl Iterator<Item = (&str, &str)> {
        self.arrays.iter().map(|(a, f)| (a.as_str(), f.as_str()))
    }

    /// Object aliases as `(alias, field)` pairs, sorted by alias.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &str)> {
        self.objects.iter().map(|(a, f)| (a.as_str(), f.as_str()))
    }

    /// Total number of registered aliases.
    pub fn len(&self) -> usize {
        self.arrays.len() + self.objects.len()
    }

    /// Returns true if no aliases are registered.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty() && self.objects.is_empty()
    }
}

/// Rewrite host-style keys in `raw` into canonical field names for `model`.
///
/// - Array aliases are renamed and their index mappings become sequences.
/// - Object aliases are renamed.
/// - Submappings of object fields are normalized with the child type's table.
/// - Submappings under undeclared keys are normalized with this level's table.
/// - Scalar values and array elements are left untouched.
pub fn normalize(raw: Map<String, Value>, model: &ModelType) -> Map<String, Value> {
    #[cfg(test)]
    PASSES.with(|passes| passes.borrow_mut().push(model.model_name().to_string()));

    let aliases = model.aliases();
    let mut out = Map::with_capacity(raw.len());

    for (key, value) in raw {
        let (key, value) = match aliases.resolve(&key) {
            Some(Alias::Array(field)) => (field.to_string(), sequence_from_index_map(value)),
            Some(Alias::Object(field)) => (field.to_string(), value),
            None => (key, value),
        };

        let value = match value {
            Value::Object(sub) => match model.slot(&key).map(|slot| slot.binding()) {
                Some(SlotBinding::Object(child)) => Value::Object(normalize(sub, child)),
                Some(_) => Value::Object(sub),
                None => Value::Object(normalize(sub, model)),
            },
            other => other,
        };
        out.insert(key, value);
    }
    out
}

// Model names of every normalize call on this thread, in call order.
#[cfg(test)]
thread_local! {
    pub(crate) static PASSES: std::cell::RefCell<Vec<String>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

/// Convert an index mapping into an ordered sequence; other values pass through.
pub(crate) fn sequence_from_index_map(value: Value) -> Value {
    match into_elements(value) {
        Ok(items) => Value::Array(items),
        Err(other) => other,
    }
}

/// The elements of a sequence or index mapping.
///
/// Numeric index keys are ordered ascending; non-numeric keys follow in
/// submission order. Any other value is handed back unchanged.
pub(crate) fn into_elements(value: Value) -> Result<Vec<Value>, Value> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut indexed: Vec<(Option<u64>, Value)> = map
                .into_iter()
                .map(|(k, v)| (parse_index(&k), v))
                .collect();
            // Stable: equal keys and non-numeric keys keep submission order.
            indexed.sort_by_key(|(index, _)| match index {
                Some(i) => (0u8, *i),
                None => (1u8, 0),
            });
            Ok(indexed.into_iter().map(|(_, v)| v).collect())
        }
        other => Err(other),
    }
}

fn parse_index(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ModelFactory;
    use formgraph_core::{ChildSchema, FieldSpec, ScalarType};
    use serde_json::json;

    fn user_schema() -> SchemaNode {
        SchemaNode::new()
            .field(FieldSpec::scalar("name", ScalarType::String))
            .field(FieldSpec::array(
                "friends",
                ChildSchema::anonymous(
                    SchemaNode::new()
                        .field(FieldSpec::scalar("name", ScalarType::String))
                        .field(FieldSpec::scalar("age", ScalarType::Integer)),
                ),
            ))
            .field(FieldSpec::object(
                "account",
                ChildSchema::anonymous(
                    SchemaNode::new()
                        .field(FieldSpec::scalar("name", ScalarType::String))
                        .field(FieldSpec::array(
                            "owners",
                            ChildSchema::anonymous(
                                SchemaNode::new().field(FieldSpec::scalar("email", ScalarType::String)),
                            ),
                        )),
                ),
            ))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn alias_table_registers_arrays_and_objects() {
        let table = AliasTable::for_schema(&user_schema());
        assert_eq!(table.resolve("friends_attributes"), Some(Alias::Array("friends")));
        assert_eq!(table.resolve("account_attributes"), Some(Alias::Object("account")));
        assert_eq!(table.resolve("name"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn singular_array_field_gets_plural_alias() {
        let schema = SchemaNode::new().field(FieldSpec::array(
            "line_item",
            ChildSchema::anonymous(SchemaNode::new()),
        ));
        let table = AliasTable::for_schema(&schema);
        assert_eq!(
            table.resolve("line_items_attributes"),
            Some(Alias::Array("line_item"))
        );
    }

    #[test]
    fn irregular_array_fields_get_host_plural_aliases() {
        let schema = SchemaNode::new()
            .field(FieldSpec::array("matrix", ChildSchema::anonymous(SchemaNode::new())))
            .field(FieldSpec::array("analyses", ChildSchema::anonymous(SchemaNode::new())));
        let table = AliasTable::for_schema(&schema);
        assert_eq!(table.resolve("matrices_attributes"), Some(Alias::Array("matrix")));
        assert_eq!(table.resolve("analyses_attributes"), Some(Alias::Array("analyses")));
        assert_eq!(table.resolve("matrixes_attributes"), None);
    }

    #[test]
    fn alias_colliding_with_declared_field_is_skipped() {
        let schema = SchemaNode::new()
            .field(FieldSpec::object("account", ChildSchema::anonymous(SchemaNode::new())))
            .field(FieldSpec::scalar("account_attributes", ScalarType::Any));
        assert!(AliasTable::for_schema(&schema).is_empty());
    }

    #[test]
    fn index_mapping_becomes_ordered_sequence() {
        let factory = ModelFactory::new();
        let model = factory.derive_type(user_schema(), Some("user"));
        let raw = object(json!({
            "name": "Foo",
            "friends_attributes": {
                "10": {"name": "Jim"},
                "1": {"name": "Joan", "age": 43},
                "0": {"name": "Joe", "age": 34}
            }
        }));
        let out = normalize(raw, &model);
        assert_eq!(
            Value::Object(out),
            json!({
                "name": "Foo",
                "friends": [
                    {"name": "Joe", "age": 34},
                    {"name": "Joan", "age": 43},
                    {"name": "Jim"}
                ]
            })
        );
    }

    #[test]
    fn non_numeric_index_keys_sort_last_in_submission_order() {
        let items = into_elements(json!({"b": 2, "1": 1, "a": 3, "0": 0})).unwrap();
        assert_eq!(items, vec![json!(0), json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn object_alias_is_renamed_and_child_keys_normalized() {
        let factory = ModelFactory::new();
        let model = factory.derive_type(user_schema(), Some("user"));
        let raw = object(json!({
            "account_attributes": {
                "name": "ACME",
                "owners_attributes": {"0": {"email": "a@acme.test"}}
            }
        }));
        let out = normalize(raw, &model);
        assert_eq!(
            Value::Object(out),
            json!({
                "account": {
                    "name": "ACME",
                    "owners": [{"email": "a@acme.test"}]
                }
            })
        );
    }

    #[test]
    fn unknown_keys_pass_through() {
        let factory = ModelFactory::new();
        let model = factory.derive_type(user_schema(), Some("user"));
        let raw = object(json!({"utf8": "✓", "commit": "Save", "name": "Foo"}));
        let out = normalize(raw.clone(), &model);
        assert_eq!(out, raw);
    }

    #[test]
    fn canonical_mapping_is_unchanged() {
        let factory = ModelFactory::new();
        let model = factory.derive_type(user_schema(), Some("user"));
        let canonical = object(json!({
            "name": "Foo",
            "friends": [{"name": "Joe", "age": 34}],
            "account": {"name": "ACME", "owners": []}
        }));
        assert_eq!(normalize(canonical.clone(), &model), canonical);
    }

    #[test]
    fn array_elements_are_not_normalized_by_the_parent() {
        let schema = SchemaNode::new().field(FieldSpec::array(
            "groups",
            ChildSchema::anonymous(SchemaNode::new().field(FieldSpec::array(
                "members",
                ChildSchema::anonymous(SchemaNode::new()),
            ))),
        ));
        let factory = ModelFactory::new();
        let model = factory.derive_type(schema, None);
        let raw = object(json!({
            "groups_attributes": {"0": {"members_attributes": {"0": {}}}}
        }));
        let out = normalize(raw, &model);
        assert_eq!(
            Value::Object(out),
            json!({"groups": [{"members_attributes": {"0": {}}}]})
        );
    }
}
