//! Domain and feature discovery and execution handlers.

use super::{required_str, required_value};
use crate::error::ToolResult;
use crate::mcp_integration::core::{ServerState, ToolCall};
use crate::mcp_integration::tools::names;
use log::debug;
use serde_json::{Value, json};

/// `list_domains`: visible domains with their descriptions.
pub async fn handle_list_domains(state: ServerState, _call: ToolCall) -> ToolResult<Value> {
    let domains: Vec<Value> = state
        .visible_domains()
        .map(|domain| {
            json!({
                "name": domain.name(),
                "description": domain.description(),
            })
        })
        .collect();
    Ok(json!({ "domains": domains }))
}

/// `list_features`: visible features of one domain.
pub async fn handle_list_features(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let domain_name = required_str(names::LIST_FEATURES, &call.arguments, "domain")?;
    let domain = match state.resolve_domain(domain_name) {
        Ok(domain) => domain,
        Err(error) => return Ok(error),
    };

    let features: Vec<Value> = domain
        .features()
        .filter(|(name, _)| !state.visibility().is_feature_hidden(domain.name(), name))
        .map(|(name, feature)| {
            json!({
                "name": name,
                "description": feature.description(),
            })
        })
        .collect();
    Ok(json!({ "features": features }))
}

/// `describe_feature`: argument and result schemas of one feature.
pub async fn handle_describe_feature(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let domain = required_str(names::DESCRIBE_FEATURE, &call.arguments, "domain")?;
    let feature_name = required_str(names::DESCRIBE_FEATURE, &call.arguments, "featureName")?;
    let feature = match state.resolve_feature(domain, feature_name) {
        Ok(feature) => feature,
        Err(error) => return Ok(error),
    };

    Ok(json!({
        "name": feature_name,
        "description": feature.description(),
        "inputSchema": feature.input_description(),
        "outputSchema": feature.output_description(),
    }))
}

/// `execute_feature`: run one feature with the merged call context.
pub async fn handle_execute_feature(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let domain = required_str(names::EXECUTE_FEATURE, &call.arguments, "domain")?;
    let feature_name = required_str(names::EXECUTE_FEATURE, &call.arguments, "featureName")?;
    let feature = match state.resolve_feature(domain, feature_name) {
        Ok(feature) => feature.clone(),
        Err(error) => return Ok(error),
    };
    let args = match call.arguments.get("args") {
        None | Some(Value::Null) => json!({}),
        Some(_) => required_value(names::EXECUTE_FEATURE, &call.arguments, "args")?,
    };

    debug!("Executing feature {}.{}", domain, feature_name);
    feature.invoke(feature_name, args, call.context).await
}
