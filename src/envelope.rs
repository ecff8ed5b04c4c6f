//! Uniform response envelope for every tool.
//!
//! Handlers produce plain JSON values (or `{"error": ...}` objects for expected
//! failures); [`format`] turns any of them into the wire [`Envelope`] and
//! [`execute`] additionally turns returned errors and panics into error
//! envelopes, so the transport never sees a failure of its own.

use crate::error::{ErrorObject, ToolError, ToolResult};
use futures::FutureExt;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// One content item of an envelope.
///
/// Tools produce `text` items; envelopes returned ready-made by a handler may
/// carry other kinds (`image`, `resource`, ...), which are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeContent(Map<String, Value>);

impl EnvelopeContent {
    pub fn text(text: impl Into<String>) -> Self {
        let mut item = Map::new();
        item.insert("type".to_string(), json!("text"));
        item.insert("text".to_string(), Value::String(text.into()));
        Self(item)
    }

    /// The item's `type` tag.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// The text of a `text` item.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind() {
            Some("text") => self.0.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The wire-level tool response.
///
/// `isError` is present (and `true`) only for error results; `structuredContent`
/// is present only when the result was a plain JSON object. Envelopes a handler
/// returns ready-made keep every other field (`_meta` and the like) in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub content: Vec<EnvelopeContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Envelope for an `{"error": ...}` value.
    pub fn error(error: &Value) -> Self {
        Self {
            content: vec![EnvelopeContent::text(error.to_string())],
            is_error: Some(true),
            structured_content: None,
            extra: Map::new(),
        }
    }

    /// Envelope for a successful result.
    pub fn success(result: &Value) -> Self {
        let text = match result {
            Value::Null => json!("").to_string(),
            other => other.to_string(),
        };
        Self {
            content: vec![EnvelopeContent::text(text)],
            is_error: None,
            structured_content: result.is_object().then(|| result.clone()),
            extra: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content item.
    pub fn text(&self) -> &str {
        self.content
            .first()
            .and_then(EnvelopeContent::as_text)
            .unwrap_or_default()
    }

    /// The first content item parsed back into JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(self.text()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({"content": []}))
    }
}

/// Whether a value already has the envelope shape (`content[0].type == "text"`).
fn as_envelope(value: &Value) -> Option<Envelope> {
    let first = value.get("content")?.as_array()?.first()?;
    if first.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn is_error_object(value: &Value) -> bool {
    value.as_object().is_some_and(|object| object.contains_key("error"))
}

/// Normalize any handler result into an envelope.
pub fn format(result: Value) -> Envelope {
    if let Some(envelope) = as_envelope(&result) {
        return envelope;
    }
    if is_error_object(&result) {
        return Envelope::error(&result);
    }
    Envelope::success(&result)
}

/// Render a handler error as its wire error object.
pub fn error_value(error: &ToolError) -> Value {
    match error {
        ToolError::Validation(validation) => ErrorObject::validation(validation).into_value(),
        other => ErrorObject::uncaught(other).into_value(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Handler panicked".to_string()
    }
}

/// Run a handler and always produce an envelope.
///
/// Validation failures become `VALIDATION_ERROR`; every other error, and any
/// panic raised while building or polling the future, becomes
/// `UNCAUGHT_EXCEPTION`.
pub async fn execute<F, Fut>(handler: F) -> Envelope
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ToolResult<Value>>,
{
    let outcome = AssertUnwindSafe(async move { handler().await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => format(value),
        Ok(Err(error)) => {
            if !matches!(error, ToolError::Validation(_)) {
                warn!("Tool handler failed: {}", error);
            }
            format(error_value(&error))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Tool handler panicked: {}", message);
            format(ErrorObject::panicked(message).into_value())
        }
    }
}
