//! MCP protocol layer for tool discovery and dispatch
//!
//! Assembles the tool registry (built-in tools, then custom tools, each wrapped
//! by the logging decorator) and routes calls to it by tool name.

use super::core::{LayersMcpServer, ToolCall, ToolDescriptor};
use super::logging;
use super::tools::builtin_tools;
use crate::context::TransportExtras;
use crate::envelope::Envelope;
use crate::error::{ErrorObject, McpError, McpResult, codes};
use log::{debug, warn};
use serde_json::{Value, json};
use std::collections::HashMap;

/// The tools of one server build, in listing order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn from_tools(tools: Vec<ToolDescriptor>) -> McpResult<Self> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), position).is_some() {
                return Err(McpError::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self { tools, index })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(ToolDescriptor::name)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|position| &self.tools[*position])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// `tools/list` entries.
    pub fn list(&self) -> Vec<Value> {
        self.tools.iter().map(ToolDescriptor::to_value).collect()
    }

    /// Call a tool by name. Unknown names produce a `TOOL_NOT_FOUND` envelope.
    pub async fn call(&self, name: &str, arguments: Value, extras: TransportExtras) -> Envelope {
        match self.get(name) {
            Some(tool) => tool.call(ToolCall::new(arguments, extras)).await,
            None => {
                warn!("Call to unknown tool: {}", name);
                Envelope::error(
                    &ErrorObject::new(codes::TOOL_NOT_FOUND, "Tool not found")
                        .with_details(json!({ "name": name }))
                        .into_value(),
                )
            }
        }
    }
}

impl LayersMcpServer {
    /// Assemble every tool for one build cycle.
    ///
    /// Order: START_HERE, domain and feature tools, model tools (unless every
    /// model is hidden), then custom tools in registration order.
    pub fn build_tools(&self) -> McpResult<ToolRegistry> {
        let tools: Vec<ToolDescriptor> = builtin_tools(&self.state)
            .into_iter()
            .chain(self.custom_tools.iter().cloned())
            .map(|tool| logging::decorate(tool, &self.log_options))
            .collect();
        debug!("Built {} tools", tools.len());
        ToolRegistry::from_tools(tools)
    }

    /// Tool definitions as JSON, for discovery.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layers_mcp_server::config::McpServerConfig;
    /// use layers_mcp_server::domains::DomainRegistry;
    /// use layers_mcp_server::mcp_integration::LayersMcpServer;
    ///
    /// let server = LayersMcpServer::new(McpServerConfig::default(), DomainRegistry::new());
    /// let tools = server.get_tools().unwrap();
    /// assert_eq!(tools[0]["name"], "START_HERE");
    /// ```
    pub fn get_tools(&self) -> McpResult<Vec<Value>> {
        Ok(self.build_tools()?.list())
    }

    /// Execute a tool by name with arguments.
    ///
    /// Always returns an envelope: unknown tools, failures and panics are all
    /// reported through `isError`. A registry that cannot be built (duplicate
    /// custom tool names) is reported the same way.
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: Value,
        extras: TransportExtras,
    ) -> Envelope {
        match self.build_tools() {
            Ok(registry) => registry.call(tool_name, arguments, extras).await,
            Err(error) => {
                warn!("Tool registry build failed: {}", error);
                Envelope::error(&ErrorObject::uncaught(&error).into_value())
            }
        }
    }
}
