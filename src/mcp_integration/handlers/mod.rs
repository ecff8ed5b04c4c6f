//! MCP integration handlers
//!
//! Built-in tool handlers, organized by functional area. Every handler takes
//! the shared [`ServerState`](crate::mcp_integration::core::ServerState) and
//! one [`ToolCall`](crate::mcp_integration::core::ToolCall) and returns a plain
//! JSON value; resolution failures come back as `{"error": ...}` values and
//! everything else as a [`ToolError`].

pub mod feature_tools;
pub mod model_tools;
pub mod system_info;

pub use feature_tools::*;
pub use model_tools::*;
pub use system_info::*;

use crate::error::{ModelValidationError, ToolError, ToolResult};
use serde_json::Value;

/// Read a required string argument.
pub(crate) fn required_str<'a>(tool: &str, arguments: &'a Value, key: &str) -> ToolResult<&'a str> {
    match arguments.get(key) {
        Some(Value::String(value)) => Ok(value),
        None | Some(Value::Null) => Err(invalid_argument(tool, key, "Required")),
        Some(_) => Err(invalid_argument(tool, key, "Expected string")),
    }
}

/// Read a required argument of any type.
pub(crate) fn required_value(tool: &str, arguments: &Value, key: &str) -> ToolResult<Value> {
    match arguments.get(key) {
        None | Some(Value::Null) => Err(invalid_argument(tool, key, "Required")),
        Some(value) => Ok(value.clone()),
    }
}

fn invalid_argument(tool: &str, key: &str, message: &str) -> ToolError {
    ModelValidationError::single(tool, key, message).into()
}
