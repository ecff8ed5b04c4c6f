//! MCP server library for layered applications.
//!
//! Exposes the domains, features and model CRUD operations of a layered
//! application as schema-described Model Context Protocol tools, with uniform
//! response envelopes, configurable visibility and cross-call context
//! propagation.
//!
//! # Core Components
//!
//! - [`LayersMcpServer`] - Builds the tool set and serves it over stdio
//! - [`DomainRegistry`] - The domains, features and models to expose
//! - [`ModelCrudsInterface`] - Trait for implementing model storage
//! - [`SchemaNode`] - Native schemas for feature arguments and results
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layers_mcp_server::{DomainRegistry, LayersMcpServer, McpServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = LayersMcpServer::new(McpServerConfig::new("my-system", "1.0.0"), DomainRegistry::new());
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod domains;
pub mod envelope;
pub mod error;
pub mod mcp_integration;
pub mod models;
pub mod schema;
pub mod storage;
pub mod visibility;

// Re-export commonly used types for convenience
pub use config::{ExampleOfUse, LoggingConfig, McpServerConfig, StartHereConfig};
pub use context::{CrossCallContext, LogId, TransportExtras};
pub use domains::{Domain, DomainRegistry, Feature, FeatureFunction, FeatureSchema};
pub use envelope::Envelope;
pub use error::{ErrorObject, McpError, McpResult, ToolError, ToolResult};
pub use mcp_integration::{LayersMcpServer, ToolCall, ToolDescriptor, ToolHandler};
pub use models::{
    FieldDefinition, FieldKind, MemoryModelCruds, ModelCrudsInterface, ModelDefinition,
    SearchQuery,
};
pub use schema::{SchemaDescription, SchemaNode, to_description, to_schema_node};
pub use storage::{InMemoryStorage, StorageProvider};
pub use visibility::{HideComponents, VisibilityResolver};
