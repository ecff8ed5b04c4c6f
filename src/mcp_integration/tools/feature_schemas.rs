//! Domain and feature tool definitions.

use super::{builtin, names, no_arguments, tool_input};
use crate::mcp_integration::core::{ServerState, ToolDescriptor};
use crate::mcp_integration::handlers::{
    handle_describe_feature, handle_execute_feature, handle_list_domains, handle_list_features,
};
use crate::schema::{SchemaNode, to_description};

fn domain_argument() -> SchemaNode {
    SchemaNode::string().describe("Name of the domain, as returned by list_domains")
}

fn feature_argument() -> SchemaNode {
    SchemaNode::string().describe("Name of the feature, as returned by list_features")
}

fn named_entries(key: &str) -> SchemaNode {
    SchemaNode::object([(
        key.to_string(),
        SchemaNode::array(SchemaNode::object([
            ("name", SchemaNode::string()),
            ("description", SchemaNode::string().nullable().optional()),
        ])),
    )])
}

pub fn list_domains_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::LIST_DOMAINS,
        "List the domains of this system with their descriptions.",
        no_arguments(),
        handle_list_domains,
    )
    .with_output_schema(to_description(&named_entries("domains")))
}

pub fn list_features_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::LIST_FEATURES,
        "List the features of a domain with their descriptions.",
        tool_input([("domain", domain_argument())]),
        handle_list_features,
    )
    .with_output_schema(to_description(&named_entries("features")))
}

pub fn describe_feature_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::DESCRIBE_FEATURE,
        "Describe the input and output schema of a feature.",
        tool_input([
            ("domain", domain_argument()),
            ("featureName", feature_argument()),
        ]),
        handle_describe_feature,
    )
}

pub fn execute_feature_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::EXECUTE_FEATURE,
        "Execute a feature. Call describe_feature first to learn the shape of args.",
        tool_input([
            ("domain", domain_argument()),
            ("featureName", feature_argument()),
            (
                "args",
                SchemaNode::record(SchemaNode::any())
                    .optional()
                    .describe("Arguments of the feature"),
            ),
        ]),
        handle_execute_feature,
    )
}
