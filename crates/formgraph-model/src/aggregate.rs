//! # Error Aggregation
//!
//! A validation engine reports failures for a whole tree in one flat list.
//! [`errors_for`] scopes that list to a single instance: after stripping the
//! instance's own location, an entry is kept only if what remains is exactly
//! one field owned by the instance's type.
//!
//! | remaining path      | owner                                  |
//! |---------------------|----------------------------------------|
//! | `name`              | this instance, field `name`            |
//! | (empty)             | this instance, key `base`              |
//! | `friends[0].name`   | element instance `friends[0]`          |
//! | `account.name`      | child instance `account`               |
//! | `unknown`           | nobody                                 |
//!
//! Every entry is therefore claimed by at most one instance in the tree.
//! A parent does not also surface a child's failure under the child's field
//! name: `account.name` appears in the `account` view only, never as an
//! `account` entry on the root. Errors on the nested field itself (`account`)
//! stay with the parent.
//! Entries addressing an instance that does not exist (an index past the end
//! of the submitted array, an absent object) are claimed by nobody.
//!
//! Aggregation never fails; an empty report yields an empty view.

use formgraph_core::{PathSegment, ValidationReport};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::instance::ModelInstance;

/// Key for failures addressed to an instance as a whole.
pub const BASE_KEY: &str = "base";

/// Field name → ordered messages, fields in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    /// An empty error view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field. Repeated messages are kept.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.entries.push((field.to_string(), vec![message.into()])),
        }
    }

    /// Messages for a field; empty if it has none.
    pub fn get(&self, field: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a field has any messages.
    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    /// Returns true if no field has messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields with messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of messages across all fields.
    pub fn count(&self) -> usize {
        self.entries.iter().map(|(_, m)| m.len()).sum()
    }

    /// Fields with their messages, in order of first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }

    /// `"<field> <message>"` for every message; `base` messages stand alone.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |m| {
                    if field == BASE_KEY {
                        m.clone()
                    } else {
                        format!("{field} {m}")
                    }
                })
            })
            .collect()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// The error view of `instance`, taken from a root-relative report.
pub fn errors_for(instance: &ModelInstance, report: &ValidationReport) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for entry in report.entries() {
        let Some(rest) = entry.path.strip_prefix(instance.location()) else {
            continue;
        };
        match rest {
            [] => errors.add(BASE_KEY, entry.message.as_str()),
            [PathSegment::Field(name)] if instance.model().slot(name).is_some() => {
                errors.add(name, entry.message.as_str())
            }
            _ => {}
        }
    }
    errors
}

impl ModelInstance {
    /// This instance's error view. See [`errors_for`].
    pub fn errors(&self, report: &ValidationReport) -> FieldErrors {
        errors_for(self, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ModelFactory;
    use formgraph_core::{ChildSchema, FieldSpec, ScalarType, SchemaNode};
    use serde_json::json;

    const REQUIRED: &str = "is required and value must be present";

    fn user(input: serde_json::Value) -> ModelInstance {
        let schema = SchemaNode::new()
            .field(FieldSpec::scalar("name", ScalarType::String).present())
            .field(FieldSpec::array(
                "friends",
                ChildSchema::anonymous(
                    SchemaNode::new()
                        .field(FieldSpec::scalar("name", ScalarType::String).present())
                        .field(FieldSpec::scalar("age", ScalarType::Integer)),
                ),
            ))
            .field(FieldSpec::object(
                "account",
                ChildSchema::anonymous(
                    SchemaNode::new().field(FieldSpec::scalar("name", ScalarType::String)),
                ),
            ));
        let model = ModelFactory::new().derive_type(schema, Some("user"));
        ModelInstance::construct(&model, input).unwrap()
    }

    #[test]
    fn root_sees_only_its_own_fields() {
        let form = user(json!({"name": "", "friends": [{"name": ""}]}));
        let report = ValidationReport::from_pairs([("name", REQUIRED), ("friends[0].name", REQUIRED)]);

        let root = form.errors(&report);
        assert_eq!(root.get("name"), [REQUIRED]);
        assert_eq!(root.len(), 1);
        assert!(!root.contains("friends"));

        let friend = form.array("friends")[0].errors(&report);
        assert_eq!(friend.get("name"), [REQUIRED]);
        assert_eq!(friend.len(), 1);
    }

    #[test]
    fn root_marker_paths_are_understood() {
        let form = user(json!({"name": ""}));
        let report = ValidationReport::from_pairs([("$.name", REQUIRED)]);
        assert_eq!(form.errors(&report).get("name"), [REQUIRED]);
    }

    #[test]
    fn nested_object_errors_belong_to_the_child() {
        let form = user(json!({"account": {"name": 5}}));
        let report = ValidationReport::from_pairs([("account.name", "must be a string")]);
        assert!(form.errors(&report).is_empty());
        let account = form.object("account").unwrap();
        assert_eq!(account.errors(&report).get("name"), ["must be a string"]);
    }

    #[test]
    fn errors_on_the_nested_field_itself_stay_with_the_parent() {
        let form = user(json!({"friends": []}));
        let report = ValidationReport::from_pairs([("friends", "is too short"), ("account", "is required")]);
        let root = form.errors(&report);
        assert_eq!(root.get("friends"), ["is too short"]);
        assert_eq!(root.get("account"), ["is required"]);
    }

    #[test]
    fn duplicate_messages_are_preserved_in_order() {
        let form = user(json!({"name": ""}));
        let report = ValidationReport::from_pairs([
            ("name", "is required"),
            ("friends[3].name", "orphan"),
            ("name", "is too short"),
            ("name", "is required"),
        ]);
        let root = form.errors(&report);
        assert_eq!(root.get("name"), ["is required", "is too short", "is required"]);
        assert_eq!(root.count(), 3);
    }

    #[test]
    fn field_order_is_first_occurrence() {
        let form = user(json!({}));
        let report = ValidationReport::from_pairs([("account", "x"), ("name", "y"), ("account", "z")]);
        let errors = form.errors(&report);
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ["account", "name"]);
    }

    #[test]
    fn orphaned_and_unknown_paths_are_dropped() {
        let form = user(json!({"friends": [{"name": "Joe"}]}));
        let report = ValidationReport::from_pairs([
            ("friends[5].name", REQUIRED),
            ("nickname", "is not allowed"),
        ]);
        assert!(form.errors(&report).is_empty());
        assert!(form.array("friends")[0].errors(&report).is_empty());
    }

    #[test]
    fn element_level_errors_go_to_base() {
        let form = user(json!({"friends": [{"name": "Joe"}]}));
        let report = ValidationReport::from_pairs([("friends[0]", "is a duplicate")]);
        assert!(form.errors(&report).is_empty());
        let friend = form.array("friends")[0].errors(&report);
        assert_eq!(friend.get(BASE_KEY), ["is a duplicate"]);
        assert_eq!(friend.full_messages(), ["is a duplicate"]);
    }

    #[test]
    fn empty_report_gives_empty_views_everywhere() {
        let form = user(json!({"friends": [{"name": "Joe"}], "account": {}}));
        let report = ValidationReport::new();
        for instance in form.walk() {
            assert!(instance.errors(&report).is_empty());
            assert!(instance.is_valid_in(&report));
        }
    }

    #[test]
    fn full_messages_and_serialization() {
        let mut errors = FieldErrors::new();
        errors.add("name", "is required");
        errors.add("age", "must be an integer");
        assert_eq!(
            errors.full_messages(),
            ["name is required", "age must be an integer"]
        );
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"name":["is required"],"age":["must be an integer"]}"#
        );
    }
}
