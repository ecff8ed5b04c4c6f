//! System overview handler.
//!
//! START_HERE is the first tool an agent should call: it names the system,
//! explains how the other tools fit together and, when configured, lists the
//! visible domains and features and some worked examples.

use crate::error::ToolResult;
use crate::mcp_integration::core::{ServerState, ToolCall};
use crate::mcp_integration::tools::names;
use serde_json::{Map, Value, json};

fn default_system_entries(state: &ServerState) -> Vec<Value> {
    let mut entries = vec![
        json!({
            "tool": names::LIST_DOMAINS,
            "usage": "Discover the domains (capability areas) of this system.",
        }),
        json!({
            "tool": names::LIST_FEATURES,
            "usage": "List the features of one domain.",
        }),
        json!({
            "tool": names::DESCRIBE_FEATURE,
            "usage": "Get the input and output schema of a feature before calling it.",
        }),
        json!({
            "tool": names::EXECUTE_FEATURE,
            "usage": "Run a feature with {domain, featureName, args}.",
        }),
    ];
    if !state.visibility().all_models_hidden() {
        entries.push(json!({
            "tool": names::LIST_MODELS,
            "usage": "List the data models of one domain; each has a modelType such as 'domain/Model'.",
        }));
        entries.push(json!({
            "tool": names::DESCRIBE_MODEL,
            "usage": "Get the schema of a model and of each operation available on it.",
        }));
        entries.push(json!({
            "tool": "model_*",
            "usage": "Save, retrieve, delete, search, bulk insert or bulk delete instances of a model by modelType.",
        }));
    }
    entries
}

fn domain_overview(state: &ServerState, include_features: bool) -> Vec<Value> {
    state
        .visible_domains()
        .map(|domain| {
            let mut entry = Map::new();
            entry.insert("name".to_string(), json!(domain.name()));
            entry.insert("description".to_string(), json!(domain.description()));
            if include_features {
                let features: Vec<Value> = domain
                    .features()
                    .filter(|(name, _)| {
                        !state.visibility().is_feature_hidden(domain.name(), name)
                    })
                    .map(|(name, feature)| {
                        json!({
                            "name": name,
                            "description": feature.description(),
                        })
                    })
                    .collect();
                entry.insert("features".to_string(), Value::Array(features));
            }
            Value::Object(entry)
        })
        .collect()
}

/// Handle START_HERE: the system overview.
pub async fn handle_start_here(state: ServerState, _call: ToolCall) -> ToolResult<Value> {
    let config = state.config();
    let start_here = &config.start_here;

    let mut overview = Map::new();
    overview.insert(
        "name".to_string(),
        json!(start_here.name.as_deref().unwrap_or(&config.name)),
    );
    overview.insert("version".to_string(), json!(config.version));
    if let Some(description) = start_here
        .description
        .as_deref()
        .or(config.description.as_deref())
    {
        overview.insert("description".to_string(), json!(description));
    }
    if !start_here.hide_default_system_entries {
        overview.insert(
            "systemEntries".to_string(),
            Value::Array(default_system_entries(&state)),
        );
    }
    if start_here.include_domains || start_here.include_features {
        overview.insert(
            "domains".to_string(),
            Value::Array(domain_overview(&state, start_here.include_features)),
        );
    }
    if !start_here.examples_of_use.is_empty() {
        overview.insert(
            "examplesOfUse".to_string(),
            serde_json::to_value(&start_here.examples_of_use)?,
        );
    }
    Ok(Value::Object(overview))
}
