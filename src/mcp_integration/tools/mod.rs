//! MCP tool definitions
//!
//! Each built-in tool pairs a native argument schema with a handler from
//! [`crate::mcp_integration::handlers`]. Tool schemas are organized by
//! functional area:
//! - [`system_schemas`] - START_HERE
//! - [`feature_schemas`] - domain and feature discovery and execution
//! - [`model_schemas`] - model discovery and CRUD
//!
//! Arguments are validated against the native schema before the handler runs;
//! the advertised `inputSchema` is derived from the same schema.

pub mod feature_schemas;
pub mod model_schemas;
pub mod system_schemas;

use crate::context::CONTEXT_KEY;
use crate::envelope;
use crate::error::ToolResult;
use crate::mcp_integration::core::{ServerState, ToolCall, ToolDescriptor};
use crate::schema::{SchemaNode, to_description};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Names of the built-in tools.
pub mod names {
    pub const START_HERE: &str = "START_HERE";
    pub const LIST_DOMAINS: &str = "list_domains";
    pub const LIST_FEATURES: &str = "list_features";
    pub const DESCRIBE_FEATURE: &str = "describe_feature";
    pub const EXECUTE_FEATURE: &str = "execute_feature";
    pub const LIST_MODELS: &str = "list_models";
    pub const DESCRIBE_MODEL: &str = "describe_model";
    pub const MODEL_SAVE: &str = "model_save";
    pub const MODEL_RETRIEVE: &str = "model_retrieve";
    pub const MODEL_DELETE: &str = "model_delete";
    pub const MODEL_SEARCH: &str = "model_search";
    pub const MODEL_BULK_INSERT: &str = "model_bulk_insert";
    pub const MODEL_BULK_DELETE: &str = "model_bulk_delete";

    pub const ALL: [&str; 13] = [
        START_HERE,
        LIST_DOMAINS,
        LIST_FEATURES,
        DESCRIBE_FEATURE,
        EXECUTE_FEATURE,
        LIST_MODELS,
        DESCRIBE_MODEL,
        MODEL_SAVE,
        MODEL_RETRIEVE,
        MODEL_DELETE,
        MODEL_SEARCH,
        MODEL_BULK_INSERT,
        MODEL_BULK_DELETE,
    ];
}

/// Every built-in tool, in listing order. Model tools are left out when all
/// models are hidden.
pub fn builtin_tools(state: &ServerState) -> Vec<ToolDescriptor> {
    let mut tools = vec![
        system_schemas::start_here_tool(state),
        feature_schemas::list_domains_tool(state),
        feature_schemas::list_features_tool(state),
        feature_schemas::describe_feature_tool(state),
        feature_schemas::execute_feature_tool(state),
    ];
    if !state.visibility().all_models_hidden() {
        tools.extend([
            model_schemas::list_models_tool(state),
            model_schemas::describe_model_tool(state),
            model_schemas::model_save_tool(state),
            model_schemas::model_retrieve_tool(state),
            model_schemas::model_delete_tool(state),
            model_schemas::model_search_tool(state),
            model_schemas::model_bulk_insert_tool(state),
            model_schemas::model_bulk_delete_tool(state),
        ]);
    }
    tools
}

/// Object schema for tool arguments, with room for the caller context.
pub(crate) fn tool_input<I, K>(fields: I) -> SchemaNode
where
    I: IntoIterator<Item = (K, SchemaNode)>,
    K: Into<String>,
{
    let context = SchemaNode::record(SchemaNode::any())
        .optional()
        .describe("Cross-call context: correlation ids and caller metadata");
    SchemaNode::object(
        fields
            .into_iter()
            .map(|(name, node)| (name.into(), node))
            .chain(std::iter::once((CONTEXT_KEY.to_string(), context))),
    )
}

/// Argument schema of a tool that takes no arguments.
pub(crate) fn no_arguments() -> SchemaNode {
    tool_input(Vec::<(String, SchemaNode)>::new())
}

/// Build a built-in tool: validate arguments, run the handler, wrap the result.
pub(crate) fn builtin<F, Fut>(
    state: &ServerState,
    name: &'static str,
    description: &str,
    input: SchemaNode,
    handler: F,
) -> ToolDescriptor
where
    F: Fn(ServerState, ToolCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolResult<Value>> + Send + 'static,
{
    let state = state.clone();
    let handler = Arc::new(handler);
    let advertised = to_description(&input);
    let validator = Arc::new(input);

    ToolDescriptor::new(name, advertised, move |call: ToolCall| {
        let state = state.clone();
        let handler = Arc::clone(&handler);
        let validator = Arc::clone(&validator);
        async move {
            envelope::execute(move || async move {
                if let Err(errors) = validator.validate(&call.arguments) {
                    return Err(errors.into_validation_error(name).into());
                }
                (*handler)(state, call).await
            })
            .await
        }
    })
    .with_description(description)
}
