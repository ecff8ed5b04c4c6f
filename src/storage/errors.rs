//! Storage failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Only JSON objects can be stored as instance documents
    #[error("Cannot store a {found} at {key}: documents must be objects")]
    NotAnObject { key: String, found: &'static str },
}

impl StorageError {
    pub(crate) fn not_an_object(key: impl ToString, document: &serde_json::Value) -> Self {
        use serde_json::Value;
        let found = match document {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Self::NotAnObject {
            key: key.to_string(),
            found,
        }
    }
}
