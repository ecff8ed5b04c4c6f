//! Property tests for the schema bridge.

use layers_mcp_server::schema::{
    JsonType, SchemaDescription, SchemaNode, to_description, to_schema_node,
};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Schema nodes without numeric bounds or descriptions.
fn leaf_node() -> impl Strategy<Value = SchemaNode> {
    prop_oneof![
        Just(SchemaNode::string()),
        Just(SchemaNode::number()),
        Just(SchemaNode::integer()),
        Just(SchemaNode::boolean()),
        Just(SchemaNode::datetime()),
        prop::collection::btree_set("[a-z]{1,5}", 1..4).prop_map(SchemaNode::enumeration),
        any::<i32>().prop_map(|n| SchemaNode::literal(n)),
        "[a-z]{0,5}".prop_map(|text: String| SchemaNode::literal(text)),
    ]
}

fn object_node(inner: impl Strategy<Value = SchemaNode>) -> impl Strategy<Value = SchemaNode> {
    prop::collection::btree_map("[a-z]{1,6}", (inner, any::<bool>()), 0..4).prop_map(|fields| {
        SchemaNode::object(fields.into_iter().map(|(name, (node, optional))| {
            (name, if optional { node.optional() } else { node })
        }))
    })
}

fn schema_node() -> impl Strategy<Value = SchemaNode> {
    leaf_node().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(SchemaNode::array),
            inner.clone().prop_map(SchemaNode::record),
            inner.clone().prop_map(SchemaNode::nullable),
            object_node(inner.clone()),
            prop::collection::vec(inner, 2..4).prop_map(SchemaNode::union),
        ]
    })
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-zA-Z$]{1,8}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn sample_values() -> Vec<Value> {
    vec![
        Value::Null,
        json!("abc"),
        json!(""),
        json!("2024-05-01T10:00:00Z"),
        json!(5),
        json!(1.5),
        json!(-3),
        json!(true),
        json!([]),
        json!(["a", "b"]),
        json!([1, 2]),
        json!({}),
        json!({"a": "x"}),
        json!({"a": 1, "b": null}),
    ]
}

proptest! {
    #[test]
    fn wire_form_is_a_fixpoint(node in schema_node()) {
        let description = to_description(&node);
        let back = to_schema_node(&description.to_value());
        prop_assert_eq!(to_description(&back), description);
    }

    #[test]
    fn round_trip_accepts_the_same_values(node in schema_node()) {
        let back = to_schema_node(&to_description(&node).to_value());
        for value in sample_values() {
            prop_assert_eq!(node.accepts(&value), back.accepts(&value), "value {}", value);
        }
    }

    #[test]
    fn required_lists_exactly_the_non_optional_fields(
        fields in prop::collection::btree_map("[a-z]{1,6}", (leaf_node(), any::<bool>()), 0..6)
    ) {
        let expected: Vec<String> = fields
            .iter()
            .filter(|(_, (_, optional))| !optional)
            .map(|(name, _)| name.clone())
            .collect();
        let node = SchemaNode::object(fields.into_iter().map(|(name, (node, optional))| {
            (name, if optional { node.optional() } else { node })
        }));

        let description = to_description(&node);
        if expected.is_empty() {
            prop_assert_eq!(description.required, None);
        } else {
            prop_assert_eq!(description.required, Some(expected));
        }
    }

    #[test]
    fn wire_to_native_never_panics(schema in json_value()) {
        let node = to_schema_node(&schema);
        let _ = to_description(&node);
    }
}

#[test]
fn test_feature_schema_scenario() {
    let args = SchemaNode::object([("name", SchemaNode::string())]);
    assert_eq!(
        to_description(&args).to_value(),
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"],
            "additionalProperties": false
        })
    );
}

#[test]
fn test_required_omitted_when_every_field_is_optional() {
    let args = SchemaNode::object([
        ("a", SchemaNode::string().optional()),
        ("b", SchemaNode::integer().with_default(3)),
    ]);
    let description = to_description(&args);
    assert_eq!(description.required, None);
    assert!(description.to_value().get("required").is_none());
}

#[test]
fn test_numeric_bounds_are_dropped_on_the_way_in() {
    let node = to_schema_node(&json!({"type": "integer", "minimum": 10, "maximum": 20}));
    assert_eq!(to_description(&node), SchemaDescription::of_type(JsonType::Integer));
    assert!(node.accepts(&json!(5)));
}

#[test]
fn test_wire_to_native_widens_unknown_shapes() {
    for schema in [json!(true), json!({}), json!({"type": "mystery"}), json!({"anyOf": []})] {
        let node = to_schema_node(&schema);
        assert!(node.accepts(&json!({"anything": [1, 2]})), "{}", schema);
    }
}

#[test]
fn test_one_member_union_collapses() {
    let node = to_schema_node(&json!({"oneOf": [{"type": "string"}]}));
    assert_eq!(node, SchemaNode::string());
}

#[test]
fn test_void_is_null() {
    assert_eq!(
        to_description(&SchemaNode::void()).to_value(),
        json!({"type": "null"})
    );
}
