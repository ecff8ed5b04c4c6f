//! Error types for tool-surface operations.
//!
//! Two families of errors live here:
//!
//! - Rust-side errors ([`McpError`], [`ToolError`], [`ModelError`]) returned through
//!   `Result` by the server builder, feature functions and the model layer.
//! - The wire-side [`ErrorObject`] that every tool renders
//!   into its response envelope as `{"error": {code, message, details?, cause?}}`.
//!
//! Resolution failures (unknown or hidden domains, features, models, operations)
//! are never raised as Rust errors; handlers return them as `{"error": ...}`
//! values (see [`not_found`]) so that hidden and absent paths look identical to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Stable error codes carried in [`ErrorObject::code`].
pub mod codes {
    /// The requested domain does not exist or is hidden.
    pub const DOMAIN_NOT_FOUND: &str = "DOMAIN_NOT_FOUND";
    /// The requested feature does not exist or is hidden.
    pub const FEATURE_NOT_FOUND: &str = "FEATURE_NOT_FOUND";
    /// The requested model does not exist or is hidden.
    pub const MODEL_NOT_FOUND: &str = "MODEL_NOT_FOUND";
    /// The domain exposes no models.
    pub const MODELS_NOT_FOUND: &str = "MODELS_NOT_FOUND";
    /// The requested model operation is hidden.
    pub const OPERATION_NOT_FOUND: &str = "OPERATION_NOT_FOUND";
    /// Data failed field validation.
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// Any other failure raised while running a handler.
    pub const UNCAUGHT_EXCEPTION: &str = "UNCAUGHT_EXCEPTION";
    /// The transport asked for a tool that is not registered.
    pub const TOOL_NOT_FOUND: &str = "TOOL_NOT_FOUND";
    /// A model search query could not be interpreted.
    pub const INVALID_QUERY: &str = "INVALID_QUERY";
}

/// Errors raised while building or serving the tool surface.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Two tools were registered under the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// A domain was registered twice
    #[error("Duplicate domain: {0}")]
    DuplicateDomain(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The MCP session could not be established or ended abnormally
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Field-level validation failure raised by the model layer.
///
/// `keys_to_errors` maps a dot-path (`"address.city"`, `"tags.0"`, or `""` for the
/// root) to the messages produced for that location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed for {model_name}: {}", summarize(.keys_to_errors))]
pub struct ModelValidationError {
    /// Name of the model (or tool) whose data was rejected
    pub model_name: String,
    /// Messages keyed by the offending field path
    pub keys_to_errors: BTreeMap<String, Vec<String>>,
}

fn summarize(keys_to_errors: &BTreeMap<String, Vec<String>>) -> String {
    keys_to_errors
        .iter()
        .map(|(key, errors)| {
            let key = if key.is_empty() { "<root>" } else { key.as_str() };
            format!("{}: {}", key, errors.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ModelValidationError {
    /// Create a validation error for the named model.
    pub fn new(
        model_name: impl Into<String>,
        keys_to_errors: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            keys_to_errors,
        }
    }

    /// Create a validation error carrying a single message for one key.
    pub fn single(
        model_name: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut keys_to_errors = BTreeMap::new();
        keys_to_errors.insert(key.into(), vec![message.into()]);
        Self::new(model_name, keys_to_errors)
    }
}

/// Errors produced by model CRUD operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Instance data failed field validation
    #[error(transparent)]
    Validation(#[from] ModelValidationError),

    /// Instance lookup failed
    #[error("{model} instance not found: {id}")]
    NotFound { model: String, id: String },

    /// Search query could not be interpreted
    #[error("Invalid search query: {message}")]
    InvalidQuery { message: String },

    /// Underlying storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors returned by feature functions, model operations and custom tools.
///
/// [`crate::envelope::execute`] distinguishes validation failures from everything
/// else; both become error envelopes, never transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Field validation failure
    #[error(transparent)]
    Validation(ModelValidationError),

    /// Model layer failure
    #[error(transparent)]
    Model(ModelError),

    /// Failure described only by a message
    #[error("{0}")]
    Message(String),

    /// Any other error
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ToolError {
    /// Create a message-only error
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an arbitrary error
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

impl From<ModelValidationError> for ToolError {
    fn from(error: ModelValidationError) -> Self {
        Self::Validation(error)
    }
}

impl From<ModelError> for ToolError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation(validation) => Self::Validation(validation),
            other => Self::Model(other),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(error: serde_json::Error) -> Self {
        Self::other(error)
    }
}

/// The standard wire error shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Machine-readable error code (see [`codes`])
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Structured detail about the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Supplementary information about the underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Value>,
}

impl ErrorObject {
    /// Create an error object with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            cause: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach cause information.
    pub fn with_cause(mut self, cause: Value) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Render as a `{"error": ...}` JSON value.
    pub fn into_value(self) -> Value {
        json!({ "error": self })
    }

    /// `VALIDATION_ERROR` object for a field validation failure.
    pub fn validation(error: &ModelValidationError) -> Self {
        Self::new(codes::VALIDATION_ERROR, "Validation errors occurred")
            .with_details(json!({
                "keysToErrors": error.keys_to_errors,
                "modelName": error.model_name,
            }))
    }

    /// `UNCAUGHT_EXCEPTION` object for any other failure.
    ///
    /// `details` carries the error's message; `cause` carries its debug form and
    /// the chain of underlying sources.
    pub fn uncaught(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut sources = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            sources.push(Value::String(source.to_string()));
            current = source.source();
        }
        Self::new(
            codes::UNCAUGHT_EXCEPTION,
            "An uncaught exception occurred while executing the tool.",
        )
        .with_details(Value::String(error.to_string()))
        .with_cause(json!({
            "error": format!("{:?}", error),
            "sources": sources,
        }))
    }

    /// `UNCAUGHT_EXCEPTION` object for a panic payload.
    pub fn panicked(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            codes::UNCAUGHT_EXCEPTION,
            "An uncaught exception occurred while executing the tool.",
        )
        .with_details(Value::String(message.clone()))
        .with_cause(json!({ "panic": message }))
    }
}

/// Convenience constructors for the resolution failures.
pub fn not_found(code: &str, message: &str) -> Value {
    ErrorObject::new(code, message).into_value()
}

// Result type aliases for convenience
pub type McpResult<T> = Result<T, McpError>;
pub type ToolResult<T> = Result<T, ToolError>;
pub type ModelResult<T> = Result<T, ModelError>;
