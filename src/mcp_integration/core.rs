//! Core MCP integration infrastructure
//!
//! Tool descriptors, the handler abstraction, the read-only state shared by the
//! built-in tools, and the [`LayersMcpServer`] builder.

use crate::config::McpServerConfig;
use crate::context::{CrossCallContext, TransportExtras};
use crate::domains::{Domain, DomainRegistry, Feature, FeatureFunction, FeatureSchema};
use crate::envelope::{self, Envelope};
use crate::error::{McpError, McpResult, codes, not_found};
use crate::mcp_integration::logging::LogOptions;
use crate::mcp_integration::tools::names;
use crate::models::{ModelCrudsInterface, parse_model_type};
use crate::schema::{SchemaDescription, SchemaNode, to_description, to_schema_node};
use crate::visibility::VisibilityResolver;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// One invocation of a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolCall {
    /// Arguments as sent by the caller (caller context removed once merged)
    pub arguments: Value,
    /// What the transport observed about the request
    pub extras: TransportExtras,
    /// The merged per-call context
    pub context: CrossCallContext,
}

impl ToolCall {
    pub fn new(arguments: Value, extras: TransportExtras) -> Self {
        Self {
            arguments,
            extras,
            context: CrossCallContext::default(),
        }
    }
}

/// Handles calls to one tool. Must always produce an envelope.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, call: ToolCall) -> Envelope;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(ToolCall) -> Fut + Send + Sync,
    Fut: Future<Output = Envelope> + Send + 'static,
{
    async fn handle(&self, call: ToolCall) -> Envelope {
        (self)(call).await
    }
}

/// A named, schema-described tool ready for a transport.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: Option<String>,
    input_schema: SchemaDescription,
    output_schema: Option<SchemaDescription>,
    handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    pub fn new<H: ToolHandler + 'static>(
        name: impl Into<String>,
        input_schema: SchemaDescription,
        handler: H,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
            output_schema: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_output_schema(mut self, output_schema: SchemaDescription) -> Self {
        self.output_schema = Some(output_schema);
        self
    }

    /// Same tool, different handler.
    pub fn with_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input_schema(&self) -> &SchemaDescription {
        &self.input_schema
    }

    pub fn output_schema(&self) -> Option<&SchemaDescription> {
        self.output_schema.as_ref()
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }

    pub async fn call(&self, call: ToolCall) -> Envelope {
        self.handler.handle(call).await
    }

    /// Entry of a `tools/list` response.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(description) = &self.description {
            object.insert("description".to_string(), Value::String(description.clone()));
        }
        object.insert("inputSchema".to_string(), self.input_schema.to_value());
        if let Some(output_schema) = &self.output_schema {
            object.insert("outputSchema".to_string(), output_schema.to_value());
        }
        Value::Object(object)
    }
}

/// Read-only state shared by the built-in tools.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub(crate) config: Arc<McpServerConfig>,
    pub(crate) domains: Arc<DomainRegistry>,
    pub(crate) visibility: Arc<VisibilityResolver>,
}

impl ServerState {
    pub fn new(config: McpServerConfig, domains: DomainRegistry) -> Self {
        let visibility = VisibilityResolver::new(&config.hide_components);
        Self {
            config: Arc::new(config),
            domains: Arc::new(domains),
            visibility: Arc::new(visibility),
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    pub fn visibility(&self) -> &VisibilityResolver {
        &self.visibility
    }

    /// Domains a caller may see, in registration order.
    pub fn visible_domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains
            .domains()
            .iter()
            .filter(|domain| !self.visibility.is_domain_hidden(domain.name()))
    }

    /// Resolve a domain, or the `DOMAIN_NOT_FOUND` error value.
    pub fn resolve_domain(&self, name: &str) -> Result<&Domain, Value> {
        match self.domains.domain(name) {
            Some(domain) if !self.visibility.is_domain_hidden(name) => Ok(domain),
            _ => Err(not_found(codes::DOMAIN_NOT_FOUND, "Domain not found")),
        }
    }

    /// Resolve a feature, or the matching not-found error value.
    pub fn resolve_feature(&self, domain: &str, feature: &str) -> Result<&Feature, Value> {
        let domain = self.resolve_domain(domain)?;
        match domain.feature(feature) {
            Some(found) if !self.visibility.is_feature_hidden(domain.name(), feature) => Ok(found),
            _ => Err(not_found(codes::FEATURE_NOT_FOUND, "Feature not found")),
        }
    }

    /// Visible models of a domain.
    pub fn visible_models<'a>(
        &'a self,
        domain: &'a Domain,
    ) -> impl Iterator<Item = &'a Arc<dyn ModelCrudsInterface>> + 'a {
        domain.models().iter().filter(move |model| {
            !self
                .visibility
                .is_model_hidden(domain.name(), model.definition().name())
        })
    }

    /// Resolve a model by its `domain/Model` type, or `MODEL_NOT_FOUND`.
    pub fn resolve_model(&self, model_type: &str) -> Result<Arc<dyn ModelCrudsInterface>, Value> {
        let model_not_found = || not_found(codes::MODEL_NOT_FOUND, "Model not found");
        let (domain, model) = parse_model_type(model_type).ok_or_else(model_not_found)?;
        if self.visibility.is_model_hidden(domain, model) {
            return Err(model_not_found());
        }
        self.domains
            .domain(domain)
            .and_then(|found| found.model(model))
            .cloned()
            .ok_or_else(model_not_found)
    }

    /// Resolve a model and check that one of its operations is exposed.
    pub fn resolve_operation(
        &self,
        model_type: &str,
        operation: &str,
    ) -> Result<Arc<dyn ModelCrudsInterface>, Value> {
        let model = self.resolve_model(model_type)?;
        let definition = model.definition();
        if self
            .visibility
            .is_operation_hidden(definition.domain(), definition.name(), operation)
        {
            return Err(not_found(codes::OPERATION_NOT_FOUND, "Operation not found"));
        }
        Ok(model)
    }
}

/// MCP server exposing domains, features and models as tools.
///
/// # Examples
///
/// ```rust
/// use layers_mcp_server::config::McpServerConfig;
/// use layers_mcp_server::domains::{Domain, DomainRegistry, Feature};
/// use layers_mcp_server::mcp_integration::LayersMcpServer;
/// use serde_json::{Value, json};
///
/// # tokio_test::block_on(async {
/// let mut domains = DomainRegistry::new();
/// domains
///     .register(Domain::new("greetings").with_feature(
///         "hello",
///         Feature::plain(|_args: Value, _context| async move { Ok(json!("hello")) }),
///     ))
///     .unwrap();
///
/// let server = LayersMcpServer::new(McpServerConfig::new("demo", "1.0.0"), domains);
/// let envelope = server
///     .execute_tool(
///         "execute_feature",
///         json!({"domain": "greetings", "featureName": "hello", "args": {}}),
///         Default::default(),
///     )
///     .await;
/// assert_eq!(envelope.text(), "\"hello\"");
/// # });
/// ```
#[derive(Clone)]
pub struct LayersMcpServer {
    pub(crate) state: ServerState,
    pub(crate) custom_tools: Vec<ToolDescriptor>,
    pub(crate) log_options: LogOptions,
}

impl fmt::Debug for LayersMcpServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayersMcpServer")
            .field("state", &self.state)
            .field("custom_tools", &self.custom_tools)
            .finish_non_exhaustive()
    }
}

impl LayersMcpServer {
    pub fn new(config: McpServerConfig, domains: DomainRegistry) -> Self {
        let log_options = LogOptions::from_config(&config.logging);
        Self {
            state: ServerState::new(config, domains),
            custom_tools: Vec::new(),
            log_options,
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        self.state.config()
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Register a custom tool. It is listed after every built-in tool.
    ///
    /// Names already taken by a built-in or custom tool are rejected.
    pub fn add_tool(&mut self, tool: ToolDescriptor) -> McpResult<()> {
        if names::ALL.contains(&tool.name())
            || self
                .custom_tools
                .iter()
                .any(|existing| existing.name() == tool.name())
        {
            return Err(McpError::DuplicateTool(tool.name().to_string()));
        }
        self.custom_tools.push(tool);
        Ok(())
    }

    /// Register a custom tool declared with a raw JSON Schema.
    ///
    /// Arguments are validated against the schema (best-effort conversion)
    /// before `handler` runs; failures are reported as `VALIDATION_ERROR` with
    /// the tool name as model name.
    pub fn add_json_schema_tool<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> McpResult<()>
    where
        F: FeatureFunction + 'static,
    {
        let name = name.into();
        let node = to_schema_node(&input_schema);
        let advertised = serde_json::from_value::<SchemaDescription>(input_schema)
            .unwrap_or_else(|_| to_description(&node));
        let feature = Arc::new(Feature::annotated(
            FeatureSchema::new(node, SchemaNode::any()),
            handler,
        ));

        let tool_name = name.clone();
        let tool = ToolDescriptor::new(name, advertised, move |call: ToolCall| {
            let feature = Arc::clone(&feature);
            let tool_name = tool_name.clone();
            async move {
                envelope::execute(move || async move {
                    feature.invoke(&tool_name, call.arguments, call.context).await
                })
                .await
            }
        })
        .with_description(description);
        self.add_tool(tool)
    }

    /// Compute extra data for the request log line from each call.
    pub fn with_request_log_data<F>(mut self, extract: F) -> Self
    where
        F: Fn(&ToolCall) -> Value + Send + Sync + 'static,
    {
        self.log_options.request_data = Some(Arc::new(extract));
        self
    }

    /// Compute extra data for the response log line from each envelope.
    pub fn with_response_log_data<F>(mut self, extract: F) -> Self
    where
        F: Fn(&Envelope) -> Value + Send + Sync + 'static,
    {
        self.log_options.response_data = Some(Arc::new(extract));
        self
    }
}
