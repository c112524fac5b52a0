//! Property tests for the validation engine

use std::collections::BTreeMap;

use conform_runtime::{ErrorKind, Kind, Schema, SchemaNode, Validate, Value};
use proptest::prelude::*;

/// Schema with required, optional and defaulted keys and no transforms.
fn interface_schema() -> Schema {
    let node = SchemaNode::map([
        (SchemaNode::from("name"), SchemaNode::of(Kind::Str)),
        (SchemaNode::from("mtu"), SchemaNode::of(Kind::Int)),
        (
            SchemaNode::optional("up").unwrap(),
            SchemaNode::default(Kind::Bool, true).unwrap(),
        ),
        (
            SchemaNode::optional("addresses").unwrap(),
            SchemaNode::list([Kind::Str]),
        ),
    ]);
    Schema::new(node)
}

fn interface() -> impl Strategy<Value = Value> {
    (
        "[a-z]{1,8}[0-9]",
        1i64..9000,
        proptest::option::of(any::<bool>()),
        proptest::option::of(proptest::collection::vec("[0-9.]{1,15}", 0..4)),
    )
        .prop_map(|(name, mtu, up, addresses)| {
            let mut map = BTreeMap::new();
            map.insert(Value::from("name"), Value::from(name));
            map.insert(Value::from("mtu"), Value::Int(mtu));
            if let Some(up) = up {
                map.insert(Value::from("up"), Value::Bool(up));
            }
            if let Some(addresses) = addresses {
                map.insert(Value::from("addresses"), Value::list(addresses));
            }
            Value::Map(map)
        })
}

proptest! {
    #[test]
    fn prop_validation_is_idempotent(data in interface()) {
        let schema = interface_schema();
        let once = schema.validate(&data).unwrap();
        let twice = schema.validate(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_output_covers_required_keys(data in interface()) {
        let out = interface_schema().validate(&data).unwrap();
        prop_assert!(out.get("name").is_some());
        prop_assert!(out.get("mtu").is_some());
        prop_assert!(out.get("up").is_some());
    }

    #[test]
    fn prop_extra_keys_are_rejected(data in interface(), extra in "x_[a-z]{1,6}") {
        let Value::Map(mut map) = data else {
            unreachable!("strategy only builds maps");
        };
        map.insert(Value::from(extra.clone()), Value::Null);

        let err = interface_schema().validate(&Value::Map(map)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::UnrecognizedKey);
        prop_assert_eq!(err.message(), format!("unrecognized key {:?}", extra));
    }

    #[test]
    fn prop_priority_ignores_declaration_order(key in "[a-z]{1,6}", n in any::<i64>()) {
        let exact = || SchemaNode::transform("exact", |_| Ok(Value::from("exact")));
        let wildcard = || SchemaNode::transform("wildcard", |_| Ok(Value::from("wildcard")));

        let forward = Schema::new(SchemaNode::map([
            (SchemaNode::optional(Kind::Str).unwrap(), wildcard()),
            (SchemaNode::optional(key.as_str()).unwrap(), exact()),
        ]));
        let backward = Schema::new(SchemaNode::map([
            (SchemaNode::optional(key.as_str()).unwrap(), exact()),
            (SchemaNode::optional(Kind::Str).unwrap(), wildcard()),
        ]));

        let data = Value::map([(key.as_str(), n)]);
        let expected = Value::map([(key.as_str(), "exact")]);
        prop_assert_eq!(forward.validate(&data).unwrap(), expected.clone());
        prop_assert_eq!(backward.validate(&data).unwrap(), expected);
    }
}
