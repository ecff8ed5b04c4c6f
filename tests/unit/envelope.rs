//! Envelope formatting: every result, failure and panic becomes an envelope.

use layers_mcp_server::envelope::{self, Envelope, EnvelopeContent};
use layers_mcp_server::error::{ModelValidationError, ToolError};
use proptest::prelude::*;
use serde_json::{Value, json};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1000i32..1000).prop_map(|n| Value::from(f64::from(n) / 8.0)),
        ".{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map(
                prop_oneof![Just("error".to_string()), "[a-z]{1,4}"],
                inner,
                0..4,
            )
            .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn every_value_formats_to_one_text_item(value in json_value()) {
        let envelope = envelope::format(value.clone());
        prop_assert_eq!(envelope.content.len(), 1);
        let wire = envelope.to_value();
        prop_assert_eq!(&wire["content"][0]["type"], "text");

        let is_error_object = value.as_object().is_some_and(|o| o.contains_key("error"));
        prop_assert_eq!(envelope.is_error(), is_error_object);
        prop_assert_eq!(wire.get("isError").is_some(), is_error_object);
    }

    #[test]
    fn structured_content_only_for_plain_objects(value in json_value()) {
        let envelope = envelope::format(value.clone());
        match value.as_object() {
            Some(object) if !object.contains_key("error") => {
                prop_assert_eq!(envelope.structured_content.as_ref(), Some(&value));
            }
            _ => prop_assert!(envelope.structured_content.is_none()),
        }
    }

    #[test]
    fn text_parses_back_to_the_value(value in json_value()) {
        let envelope = envelope::format(value.clone());
        let expected = if value.is_null() { json!("") } else { value };
        prop_assert_eq!(envelope.json(), Some(expected));
    }

    #[test]
    fn failures_never_escape(message in ".{0,20}") {
        let envelope = tokio_test::block_on(envelope::execute(|| async move {
            Err(ToolError::message(message))
        }));
        prop_assert!(envelope.is_error());
        let error = envelope.json().unwrap();
        prop_assert_eq!(&error["error"]["code"], "UNCAUGHT_EXCEPTION");
    }
}

#[test]
fn test_existing_envelope_passes_through() {
    let ready = json!({"content": [{"type": "text", "text": "done"}], "isError": true});
    let envelope = envelope::format(ready);
    assert!(envelope.is_error());
    assert_eq!(envelope.content, vec![EnvelopeContent::text("done")]);
}

#[test]
fn test_ready_envelope_with_resource_and_meta_is_returned_unchanged() {
    let ready = json!({
        "content": [
            {"type": "text", "text": "see attached"},
            {"type": "resource", "resource": {"uri": "file:///report.csv", "text": "a,b"}}
        ],
        "_meta": {"progressToken": 4}
    });
    let envelope = envelope::format(ready.clone());
    assert!(!envelope.is_error());
    assert_eq!(envelope.text(), "see attached");
    assert_eq!(envelope.content[1].kind(), Some("resource"));
    assert_eq!(envelope.to_value(), ready);
}

#[test]
fn test_null_renders_as_empty_string() {
    let envelope = envelope::format(Value::Null);
    assert_eq!(envelope.text(), "\"\"");
    assert!(!envelope.is_error());
}

#[test]
fn test_error_envelope_wire_shape() {
    let envelope = Envelope::error(&json!({"error": {"code": "X", "message": "m"}}));
    let wire = envelope.to_value();
    assert_eq!(wire["isError"], true);
    assert!(wire.get("structuredContent").is_none());
}

#[tokio::test]
async fn test_validation_failure_is_reported_as_validation_error() {
    let envelope = envelope::execute(|| async {
        Err(ModelValidationError::single("Book", "title", "Required").into())
    })
    .await;
    let error = envelope.json().unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(error["error"]["details"]["modelName"], "Book");
    assert_eq!(error["error"]["details"]["keysToErrors"]["title"], json!(["Required"]));
}

#[tokio::test]
async fn test_panic_is_reported_as_uncaught() {
    let envelope = envelope::execute(|| async {
        if true {
            panic!("handler exploded");
        }
        Ok(Value::Null)
    })
    .await;
    let error = envelope.json().unwrap();
    assert_eq!(error["error"]["code"], "UNCAUGHT_EXCEPTION");
    assert_eq!(error["error"]["details"], "handler exploded");
}
