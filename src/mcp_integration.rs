//! MCP (Model Context Protocol) integration for layered systems
//!
//! This module exposes the domains, features and models of a layered system as
//! discoverable, schema-described tools for AI agents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   AI Agent      │───▶│  MCP Protocol    │───▶│  Domains        │
//! │   (Client)      │    │  (This Module)   │    │  Features       │
//! └─────────────────┘    └──────────────────┘    │  Model CRUDS    │
//!          │                        │            └─────────────────┘
//!          ▼                        ▼
//!    Tool Discovery          Argument Validation
//!    Schema Learning         Context Merging
//!    Error Envelopes         Request/Response Logging
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use layers_mcp_server::config::McpServerConfig;
//! use layers_mcp_server::domains::{Domain, DomainRegistry, Feature};
//! use layers_mcp_server::mcp_integration::LayersMcpServer;
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut domains = DomainRegistry::new();
//!     domains.register(
//!         Domain::new("greetings").with_feature(
//!             "hello",
//!             Feature::plain(|args: Value, _context| async move {
//!                 Ok(json!({ "greeting": format!("Hello {}", args["name"]) }))
//!             }),
//!         ),
//!     )?;
//!
//!     let server = LayersMcpServer::new(McpServerConfig::new("greeter", "1.0.0"), domains);
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Available Tools
//!
//! ### System
//! - **`START_HERE`** - Overview of the system and how to use it
//!
//! ### Domains and Features
//! - **`list_domains`** - Domains with descriptions
//! - **`list_features`** - Features of one domain
//! - **`describe_feature`** - Input and output schema of a feature
//! - **`execute_feature`** - Run a feature with arguments
//!
//! ### Models
//! - **`list_models`**, **`describe_model`**
//! - **`model_save`**, **`model_retrieve`**, **`model_delete`**
//! - **`model_search`**, **`model_bulk_insert`**, **`model_bulk_delete`**
//!
//! ## Serving
//!
//! [`LayersMcpServer::start`] serves over stdio with the `rmcp` SDK; each
//! connection is a [`Session`], which implements `rmcp::ServerHandler`.
//!
//! Custom tools registered with [`LayersMcpServer::add_tool`] follow the
//! built-in tools. Every result, including failures, is a tool envelope with
//! `isError` set accordingly.

pub mod core;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod tools;
pub mod transport;


pub use core::{LayersMcpServer, ServerState, ToolCall, ToolDescriptor, ToolHandler};
pub use logging::LogOptions;
pub use protocol::ToolRegistry;
pub use transport::Session;
