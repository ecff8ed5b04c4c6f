//! Schema bridge between native validation schemas and wire descriptions.
//!
//! Tools advertise their arguments and results to callers as JSON-Schema-like
//! [`SchemaDescription`]s, while features declare them as native [`SchemaNode`]s
//! that can also validate values. This module converts in both directions.
//!
//! # Key Types
//!
//! - [`SchemaNode`] - Closed tagged union of native schema shapes
//! - [`SchemaDescription`] - Wire form (`type`, `properties`, `anyOf`, ...)
//! - [`SchemaErrors`] - Per-path validation messages
//!
//! # Examples
//!
//! ```rust
//! use layers_mcp_server::schema::{SchemaNode, to_description, to_schema_node};
//! use serde_json::json;
//!
//! let args = SchemaNode::object([
//!     ("name", SchemaNode::string()),
//!     ("age", SchemaNode::integer().min(0.0).optional()),
//! ]);
//!
//! let description = to_description(&args);
//! assert_eq!(description.required, Some(vec!["name".to_string()]));
//!
//! let back = to_schema_node(&description.to_value());
//! assert!(back.accepts(&json!({"name": "Ada"})));
//! assert!(!back.accepts(&json!({"age": 3})));
//! ```

pub mod bridge;
pub mod description;
pub mod node;
pub mod validation;


pub use bridge::{description_to_schema_node, to_description, to_schema_node};
pub use description::{AdditionalProperties, JsonType, SchemaDescription};
pub use node::{NumberChecks, SchemaKind, SchemaNode, StringChecks, StringFormat};
pub use validation::SchemaErrors;
