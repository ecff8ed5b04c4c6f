//! MCP session handling on top of the `rmcp` SDK.
//!
//! [`Session`] puts a [`LayersMcpServer`] behind [`rmcp::ServerHandler`]:
//! `tools/list` answers from [`ToolRegistry::list`] and `tools/call` dispatches
//! through [`ToolRegistry::call`]. Framing, ids, the initialize handshake and
//! protocol errors are the SDK's business.
//!
//! In stateless mode the tool registry is rebuilt for every request; otherwise
//! it is built once per session.

use super::core::LayersMcpServer;
use super::protocol::ToolRegistry;
use crate::context::{RequestInfo, TransportExtras};
use crate::envelope::Envelope;
use crate::error::{McpError, McpResult};
use log::{debug, info};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RunningService};
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::borrow::Cow;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::OnceCell;

/// One MCP connection: the server plus what the transport observed about it.
pub struct Session {
    server: LayersMcpServer,
    extras: TransportExtras,
    registry: OnceCell<ToolRegistry>,
}

impl Session {
    /// A session whose tool calls carry `extras` as transport metadata.
    pub fn new(server: LayersMcpServer, extras: TransportExtras) -> Self {
        Self {
            server,
            extras,
            registry: OnceCell::new(),
        }
    }

    pub fn server(&self) -> &LayersMcpServer {
        &self.server
    }

    async fn registry(&self) -> McpResult<Cow<'_, ToolRegistry>> {
        if self.server.config().stateless {
            return self.server.build_tools().map(Cow::Owned);
        }
        self.registry
            .get_or_try_init(|| async { self.server.build_tools() })
            .await
            .map(Cow::Borrowed)
    }
}

/// Our tool listings and envelopes are already MCP wire JSON; the SDK's model
/// types read them as-is.
fn into_sdk<T: DeserializeOwned>(value: Value) -> Result<T, ErrorData> {
    serde_json::from_value(value).map_err(|error| ErrorData::internal_error(error.to_string(), None))
}

fn internal(error: McpError) -> ErrorData {
    ErrorData::internal_error(error.to_string(), None)
}

impl ServerHandler for Session {
    fn get_info(&self) -> ServerInfo {
        let config = self.server.config();
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: config.name.clone(),
                version: config.version.clone(),
                ..Default::default()
            },
            instructions: config.description.clone(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let registry = self.registry().await.map_err(internal)?;
        into_sdk(json!({ "tools": registry.list() }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let registry = self.registry().await.map_err(internal)?;
        let arguments = request.arguments.map(Value::Object).unwrap_or_else(|| json!({}));
        let envelope: Envelope = registry
            .call(&request.name, arguments, self.extras.clone())
            .await;
        into_sdk(envelope.to_value())
    }
}

/// Wait for a started session to end.
async fn run<E: std::fmt::Display>(
    started: Result<RunningService<RoleServer, Session>, E>,
) -> McpResult<()> {
    let running = started.map_err(|error| McpError::Transport(error.to_string()))?;
    let reason = running
        .waiting()
        .await
        .map_err(|error| McpError::Transport(error.to_string()))?;
    debug!("Session ended: {:?}", reason);
    Ok(())
}

fn stdio_extras() -> TransportExtras {
    TransportExtras::new(RequestInfo {
        protocol: "stdio".to_string(),
        ..RequestInfo::default()
    })
}

impl LayersMcpServer {
    /// A session handler for one connection.
    pub fn session(&self, extras: TransportExtras) -> Session {
        Session::new(self.clone(), extras)
    }

    /// Run one session over a byte stream pair until the peer disconnects.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        run(self.session(stdio_extras()).serve((reader, writer)).await).await
    }

    /// Serve on the process's stdin and stdout.
    pub async fn start(&self) -> McpResult<()> {
        let tool_count = self.build_tools()?.len();
        info!(
            "{} {} ready on stdio with {} tools",
            self.config().name,
            self.config().version,
            tool_count
        );
        run(self.session(stdio_extras()).serve(stdio()).await).await
    }
}
