//! Property tests: derivation equivalence, normalization idempotence,
//! construction round-trips, and error-view partitioning.

use std::collections::BTreeMap;

use formgraph_core::{ChildSchema, ErrorPath, FieldSpec, ScalarType, SchemaNode, ValidationReport};
use formgraph_model::{normalize, ModelFactory, ModelInstance};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn scalar_type() -> impl Strategy<Value = ScalarType> {
    prop_oneof![
        Just(ScalarType::String),
        Just(ScalarType::Integer),
        Just(ScalarType::Number),
        Just(ScalarType::Boolean),
        Just(ScalarType::Any),
    ]
}

fn schema_node() -> impl Strategy<Value = SchemaNode> {
    let leaf = prop::collection::vec(("[a-z]{1,6}", scalar_type(), any::<bool>()), 0..5).prop_map(
        |fields| {
            fields
                .into_iter()
                .map(|(name, t, present)| {
                    let spec = FieldSpec::scalar(name, t);
                    if present {
                        spec.present()
                    } else {
                        spec
                    }
                })
                .collect::<SchemaNode>()
        },
    );
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            inner.clone(),
            prop::collection::vec(("[a-z]{1,6}", inner, any::<bool>(), any::<bool>()), 0..3),
        )
            .prop_map(|(base, nested)| {
                nested.into_iter().fold(base, |schema, (name, child, array, named)| {
                    let child = if named {
                        ChildSchema::named(format!("{name}_form"), child)
                    } else {
                        ChildSchema::anonymous(child)
                    };
                    schema.field(if array {
                        FieldSpec::array(name, child)
                    } else {
                        FieldSpec::object(name, child)
                    })
                })
            })
    })
}

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
                SchemaNode::new().field(FieldSpec::scalar("name", ScalarType::String)),
            ),
        ))
}

fn friend() -> impl Strategy<Value = Value> {
    (prop::option::of("[A-Za-z ]{0,8}"), prop::option::of(0i64..120)).prop_map(|(name, age)| {
        let mut map = Map::new();
        if let Some(name) = name {
            map.insert("name".into(), json!(name));
        }
        if let Some(age) = age {
            map.insert("age".into(), json!(age));
        }
        Value::Object(map)
    })
}

/// Canonical user data. Any field may be left out; `to_value` leaves out
/// the same fields.
fn canonical_user() -> impl Strategy<Value = Value> {
    (
        prop::option::of("[A-Za-z ]{0,8}"),
        prop::option::of(prop::collection::vec(friend(), 0..4)),
        prop::option::of(prop::option::of("[A-Za-z]{0,8}")),
    )
        .prop_map(|(name, friends, account)| {
            let mut map = Map::new();
            if let Some(name) = name {
                map.insert("name".into(), json!(name));
            }
            if let Some(friends) = friends {
                map.insert("friends".into(), Value::Array(friends));
            }
            if let Some(account_name) = account {
                let mut account = Map::new();
                if let Some(n) = account_name {
                    account.insert("name".into(), json!(n));
                }
                map.insert("account".into(), Value::Object(account));
            }
            Value::Object(map)
        })
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

proptest! {
    /// Two independent derivations of one schema agree on fields and wiring.
    #[test]
    fn derivation_is_structurally_idempotent(schema in schema_node()) {
        let a = ModelFactory::new().derive_type(schema.clone(), Some("root"));
        let b = ModelFactory::new().derive_type(schema, Some("root"));
        prop_assert!(a.is_equivalent(&b));
    }

    /// Normalizing a canonical mapping leaves it unchanged.
    #[test]
    fn normalize_is_identity_on_canonical_data(data in canonical_user()) {
        let model = ModelFactory::new().derive_type(user_schema(), Some("user"));
        let map = into_map(data);
        prop_assert_eq!(normalize(map.clone(), &model), map);
    }

    /// Host-style submissions normalize to the same thing once or twice.
    #[test]
    fn normalize_is_idempotent_on_host_data(friends in prop::collection::vec(friend(), 0..5)) {
        let model = ModelFactory::new().derive_type(user_schema(), Some("user"));
        let indexed: Map<String, Value> = friends
            .iter()
            .enumerate()
            .map(|(i, f)| (i.to_string(), f.clone()))
            .collect();
        let raw = into_map(json!({"friends_attributes": indexed}));
        let once = normalize(raw, &model);
        prop_assert_eq!(once.get("friends"), Some(&Value::Array(friends)));
        prop_assert_eq!(normalize(once.clone(), &model), once);
    }

    /// Reading an instance back yields the data it was built from.
    #[test]
    fn construction_round_trips(data in canonical_user()) {
        let model = ModelFactory::new().derive_type(user_schema(), Some("user"));
        let user = ModelInstance::construct(&model, data.clone()).unwrap();
        prop_assert_eq!(user.scalar("name"), data.get("name"));
        for (i, friend) in user.array("friends").iter().enumerate() {
            prop_assert_eq!(friend.scalar("name"), data["friends"][i].get("name"));
            prop_assert_eq!(friend.scalar("age"), data["friends"][i].get("age"));
        }
        prop_assert_eq!(user.to_value(), data);
    }

    /// Every entry addressing an existing field is claimed by exactly one
    /// instance, and reconstructing paths from the views gives back the list.
    #[test]
    fn error_views_partition_the_report(
        data in canonical_user(),
        picks in prop::collection::vec((any::<prop::sample::Index>(), "[a-z]{1,6}"), 0..12),
    ) {
        let model = ModelFactory::new().derive_type(user_schema(), Some("user"));
        let user = ModelInstance::construct(&model, data).unwrap();

        let candidates: Vec<ErrorPath> = user
            .walk()
            .flat_map(|i| i.model().field_names().map(|f| i.location().child(f)).collect::<Vec<_>>())
            .collect();
        let report: ValidationReport = picks
            .iter()
            .map(|(pick, message)| {
                formgraph_core::ErrorEntry::new(pick.get(&candidates).clone(), message.clone())
            })
            .collect();

        let mut expected: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in report.entries() {
            expected.entry(entry.path.to_string()).or_default().push(entry.message.clone());
        }

        let mut reconstructed: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for instance in user.walk() {
            for (field, messages) in instance.errors(&report).iter() {
                let path = instance.location().child(field).to_string();
                reconstructed.entry(path).or_default().extend(messages.iter().cloned());
            }
        }
        prop_assert_eq!(reconstructed, expected);
    }
}
