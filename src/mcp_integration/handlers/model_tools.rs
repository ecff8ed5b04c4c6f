//! Model discovery and CRUD handlers.
//!
//! Model tools are shared by every model and select one with the `modelType`
//! argument (`"<domain>/<ModelName>"`). Hidden and absent models both resolve
//! to `MODEL_NOT_FOUND`; a hidden operation of a visible model resolves to
//! `OPERATION_NOT_FOUND`.

use super::{required_str, required_value};
use crate::error::{
    ErrorObject, ModelError, ModelValidationError, ToolError, ToolResult, codes, not_found,
};
use crate::mcp_integration::core::{ServerState, ToolCall};
use crate::mcp_integration::tools::model_schemas::{self, operations};
use crate::mcp_integration::tools::names;
use crate::models::{ModelCrudsInterface, SearchQuery, instances_to_obj};
use log::debug;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Resolve `modelType` for an operation, or the error value to return.
fn resolve(
    state: &ServerState,
    tool: &str,
    call: &ToolCall,
    operation: &str,
) -> ToolResult<Result<Arc<dyn ModelCrudsInterface>, Value>> {
    let model_type = required_str(tool, &call.arguments, "modelType")?;
    Ok(state.resolve_operation(model_type, operation))
}

/// `list_models`: visible models of one domain.
pub async fn handle_list_models(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let domain_name = required_str(names::LIST_MODELS, &call.arguments, "domain")?;
    let domain = match state.resolve_domain(domain_name) {
        Ok(domain) => domain,
        Err(error) => return Ok(error),
    };
    if state.visibility().are_models_hidden(domain.name()) {
        return Ok(not_found(codes::MODELS_NOT_FOUND, "Models not found"));
    }

    let models: Vec<Value> = state
        .visible_models(domain)
        .map(|model| model.definition().summary())
        .collect();
    if models.is_empty() {
        return Ok(not_found(codes::MODELS_NOT_FOUND, "Models not found"));
    }
    Ok(json!({ "models": models }))
}

/// `describe_model`: the model schema and the input of each exposed operation.
pub async fn handle_describe_model(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model_type = required_str(names::DESCRIBE_MODEL, &call.arguments, "modelType")?;
    let model = match state.resolve_model(model_type) {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let definition = model.definition();

    let mut exposed = Map::new();
    for operation in operations::ALL {
        if state
            .visibility()
            .is_operation_hidden(definition.domain(), definition.name(), operation)
        {
            continue;
        }
        exposed.insert(
            operation.to_string(),
            json!({
                "inputSchema": model_schemas::operation_input_schema(definition, operation),
            }),
        );
    }

    Ok(json!({
        "modelType": definition.model_type(),
        "description": definition.description(),
        "primaryKey": definition.primary_key(),
        "schema": definition.json_schema(),
        "operations": exposed,
    }))
}

/// `model_save`: create or replace an instance.
pub async fn handle_model_save(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_SAVE, &call, operations::SAVE)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let instance = required_value(names::MODEL_SAVE, &call.arguments, "instance")?;
    let saved = model.save(instance).await?;
    Ok(saved.into_obj())
}

/// `model_retrieve`: fetch one instance, `null` when absent.
pub async fn handle_model_retrieve(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_RETRIEVE, &call, operations::RETRIEVE)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let id = required_str(names::MODEL_RETRIEVE, &call.arguments, "id")?;
    let found = model.retrieve(id).await?;
    Ok(found.map(|instance| instance.into_obj()).unwrap_or(Value::Null))
}

/// `model_delete`: delete one instance.
pub async fn handle_model_delete(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_DELETE, &call, operations::DELETE)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let id = required_str(names::MODEL_DELETE, &call.arguments, "id")?;
    model.delete(id).await?;
    Ok(Value::Null)
}

/// `model_search`: run a search query.
pub async fn handle_model_search(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_SEARCH, &call, operations::SEARCH)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let search = match call.arguments.get("search") {
        None | Some(Value::Null) => json!({}),
        Some(search) => search.clone(),
    };

    let outcome = match SearchQuery::from_value(search) {
        Ok(query) => model.search(&query).await,
        Err(error) => Err(error),
    };
    match outcome {
        Ok(result) => Ok(result.to_obj()),
        Err(ModelError::InvalidQuery { message }) => {
            debug!("Rejected search on {}: {}", model.definition().model_type(), message);
            Ok(ErrorObject::new(codes::INVALID_QUERY, "Invalid search query")
                .with_details(Value::String(message))
                .into_value())
        }
        Err(other) => Err(ToolError::from(other)),
    }
}

/// `model_bulk_insert`: validate and save several instances.
pub async fn handle_model_bulk_insert(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_BULK_INSERT, &call, operations::BULK_INSERT)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let items = match required_value(names::MODEL_BULK_INSERT, &call.arguments, "items")? {
        Value::Array(items) => items,
        _ => {
            return Err(ModelValidationError::single(
                names::MODEL_BULK_INSERT,
                "items",
                "Expected array",
            )
            .into());
        }
    };
    let saved = model.bulk_insert(items).await?;
    Ok(instances_to_obj(&saved))
}

/// `model_bulk_delete`: delete several instances by id.
pub async fn handle_model_bulk_delete(state: ServerState, call: ToolCall) -> ToolResult<Value> {
    let model = match resolve(&state, names::MODEL_BULK_DELETE, &call, operations::BULK_DELETE)? {
        Ok(model) => model,
        Err(error) => return Ok(error),
    };
    let ids = required_value(names::MODEL_BULK_DELETE, &call.arguments, "ids")?;
    let ids: Vec<String> = serde_json::from_value(ids).map_err(|_| {
        ModelValidationError::single(
            names::MODEL_BULK_DELETE,
            "ids",
            "Expected array of strings",
        )
    })?;
    model.bulk_delete(&ids).await?;
    Ok(Value::Null)
}
