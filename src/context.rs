//! Cross-call context construction.
//!
//! Every tool invocation receives a [`CrossCallContext`] built from up to four
//! sources, merged in order:
//!
//! 1. a context object the caller sends at the top level of the tool arguments
//!    (under [`CONTEXT_KEY`]),
//! 2. the same shape nested inside the `args` field of execute-style tools,
//! 3. request metadata and auth observed by the transport ([`TransportExtras`]),
//! 4. the correlation ids generated for this call.
//!
//! Later sources win on key collisions, the transport always wins for
//! `requestInfo`/`authInfo`, and `logging.ids` is concatenated across every
//! source so a trace chain survives nested and forwarded calls.

use log::debug;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Argument key under which callers pass their context.
pub const CONTEXT_KEY: &str = "crossLayerProps";

/// Key of the per-call correlation id generated by the logging decorator.
pub const REQUEST_ID_KEY: &str = "requestId";

/// Request metadata observed by the transport.
///
/// Always present on a merged context. Transports that cannot observe a field
/// (stdio has no headers or URL) leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestInfo {
    pub headers: Map<String, Value>,
    pub body: Value,
    pub query: Map<String, Value>,
    pub params: Map<String, Value>,
    pub path: String,
    pub method: String,
    pub url: String,
    pub protocol: String,
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self {
            headers: Map::new(),
            body: json!({}),
            query: Map::new(),
            params: Map::new(),
            path: String::new(),
            method: String::new(),
            url: String::new(),
            protocol: String::new(),
        }
    }
}

impl RequestInfo {
    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into(), Value::String(value.into()));
        self
    }
}

/// Validated auth data surfaced by the transport. Carried through, never checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub token: String,
    pub client_id: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

/// Transport-level extras handed to every tool handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportExtras {
    pub request_info: RequestInfo,
    pub auth_info: Option<AuthInfo>,
}

impl TransportExtras {
    pub fn new(request_info: RequestInfo) -> Self {
        Self {
            request_info,
            auth_info: None,
        }
    }

    pub fn with_auth(mut self, auth_info: AuthInfo) -> Self {
        self.auth_info = Some(auth_info);
        self
    }
}

/// One correlation id, serialized as a single-key map such as
/// `{"requestId": "5f0c..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogId {
    name: String,
    value: String,
}

impl LogId {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A fresh `requestId` correlation id.
    pub fn request_id() -> Self {
        Self::new(REQUEST_ID_KEY, uuid::Uuid::new_v4().to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Read a caller-supplied id leniently. Anything other than a single-key
    /// object is dropped.
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (name, value) = object.iter().next()?;
        let value = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Some(Self::new(name.clone(), value))
    }
}

impl Serialize for LogId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for LogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LogIdVisitor;

        impl<'de> Visitor<'de> for LogIdVisitor {
            type Value = LogId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key map of correlation id name to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LogId, A::Error> {
                let (name, value): (String, String) = map
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(LogId::new(name, value))
            }
        }

        deserializer.deserialize_map(LogIdVisitor)
    }
}

/// Correlation data for a chain of calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingInfo {
    /// Ids in the order they were added, oldest first
    pub ids: Vec<LogId>,
}

/// The canonical per-call context passed to handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCallContext {
    #[serde(default)]
    pub request_info: RequestInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_info: Option<AuthInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingInfo>,

    /// Any other keys the caller supplied
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CrossCallContext {
    /// Correlation ids, oldest first.
    pub fn log_ids(&self) -> &[LogId] {
        self.logging
            .as_ref()
            .map(|logging| logging.ids.as_slice())
            .unwrap_or(&[])
    }

    /// The most recently added `requestId`, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.log_ids()
            .iter()
            .rev()
            .find(|id| id.name() == REQUEST_ID_KEY)
            .map(LogId::value)
    }

    /// Render as a JSON object, suitable for forwarding as a caller context.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}

/// Caller-supplied context objects removed from tool arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    /// Context sent at the top level of the arguments
    pub top_level: Option<Value>,
    /// Context sent inside the `args` field
    pub nested: Option<Value>,
}

impl ClientContext {
    /// Remove caller context from `arguments`, leaving clean handler input.
    pub fn extract(arguments: &mut Value) -> Self {
        let Some(object) = arguments.as_object_mut() else {
            return Self::default();
        };
        let top_level = object.remove(CONTEXT_KEY);
        let nested = object
            .get_mut("args")
            .and_then(Value::as_object_mut)
            .and_then(|args| args.remove(CONTEXT_KEY));
        Self { top_level, nested }
    }
}

/// Builds [`CrossCallContext`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextMerger;

impl ContextMerger {
    /// Merge every context source for one call.
    ///
    /// When the transport carries no auth, a client-claimed `authInfo` is
    /// dropped rather than trusted.
    pub fn merge(
        client_top_level: Option<&Value>,
        client_nested: Option<&Value>,
        transport: &TransportExtras,
        logger_ids: &[LogId],
    ) -> CrossCallContext {
        let mut merged = Map::new();
        let mut ids = Vec::new();

        for source in [client_top_level, client_nested].into_iter().flatten() {
            match source.as_object() {
                Some(object) => shallow_merge(&mut merged, &mut ids, object),
                None => debug!("Ignoring non-object caller context: {}", source),
            }
        }

        merged.remove("requestInfo");
        merged.remove("authInfo");
        ids.extend(logger_ids.iter().cloned());

        CrossCallContext {
            request_info: transport.request_info.clone(),
            auth_info: transport.auth_info.clone(),
            logging: if ids.is_empty() {
                None
            } else {
                Some(LoggingInfo { ids })
            },
            extra: merged,
        }
    }

    /// Merge the caller context carried by `arguments` and strip it from them.
    pub fn merge_arguments(
        arguments: &mut Value,
        transport: &TransportExtras,
        logger_ids: &[LogId],
    ) -> CrossCallContext {
        let client = ClientContext::extract(arguments);
        Self::merge(
            client.top_level.as_ref(),
            client.nested.as_ref(),
            transport,
            logger_ids,
        )
    }
}

fn shallow_merge(merged: &mut Map<String, Value>, ids: &mut Vec<LogId>, source: &Map<String, Value>) {
    for (key, value) in source {
        if key == "logging" {
            let incoming = value
                .get("ids")
                .and_then(Value::as_array)
                .map(|values| values.iter().filter_map(LogId::from_value).collect::<Vec<_>>())
                .unwrap_or_default();
            ids.extend(incoming);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
}
