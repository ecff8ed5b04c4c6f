//! Model tool definitions and per-model operation schemas.

use super::{builtin, names, tool_input};
use crate::mcp_integration::core::{ServerState, ToolDescriptor};
use crate::mcp_integration::handlers::{
    handle_describe_model, handle_list_models, handle_model_bulk_delete, handle_model_bulk_insert,
    handle_model_delete, handle_model_retrieve, handle_model_save, handle_model_search,
};
use crate::models::ModelDefinition;
use crate::schema::{JsonType, SchemaDescription, SchemaNode, to_description};

/// Operation names, as used in hide paths (`domain.cruds.Model.<operation>`).
pub mod operations {
    pub const SAVE: &str = "save";
    pub const RETRIEVE: &str = "retrieve";
    pub const DELETE: &str = "delete";
    pub const SEARCH: &str = "search";
    pub const BULK_INSERT: &str = "bulkInsert";
    pub const BULK_DELETE: &str = "bulkDelete";

    pub const ALL: [&str; 6] = [SAVE, RETRIEVE, DELETE, SEARCH, BULK_INSERT, BULK_DELETE];
}

fn model_type_argument() -> SchemaNode {
    SchemaNode::string().describe("Model type as returned by list_models, e.g. 'library/Book'")
}

fn id_argument() -> SchemaNode {
    SchemaNode::string().describe("Primary key of the instance")
}

fn open_object() -> SchemaNode {
    SchemaNode::record(SchemaNode::any())
}

/// Native schema of a search query.
pub fn search_query_node() -> SchemaNode {
    let statement = SchemaNode::object([
        ("type", SchemaNode::literal("property").optional()),
        ("key", SchemaNode::string().describe("Property to compare")),
        ("value", SchemaNode::any().describe("Value to compare against")),
        (
            "valueType",
            SchemaNode::enumeration(["string", "number", "boolean", "date", "object"]).optional(),
        ),
        (
            "equalitySymbol",
            SchemaNode::enumeration(["=", "<", "<=", ">", ">="]).optional(),
        ),
        (
            "options",
            SchemaNode::object([
                ("caseSensitive", SchemaNode::boolean().optional()),
                ("startsWith", SchemaNode::boolean().optional()),
                ("endsWith", SchemaNode::boolean().optional()),
            ])
            .optional(),
        ),
    ]);

    SchemaNode::object([
        (
            "query",
            SchemaNode::array(SchemaNode::union(vec![
                statement,
                SchemaNode::enumeration(["AND", "OR"]),
            ]))
            .optional()
            .describe("Property statements joined by AND/OR, evaluated left to right"),
        ),
        (
            "take",
            SchemaNode::integer()
                .min(0.0)
                .optional()
                .describe("Maximum number of instances to return"),
        ),
        (
            "sort",
            SchemaNode::object([
                ("key", SchemaNode::string()),
                ("order", SchemaNode::enumeration(["asc", "dsc"]).optional()),
            ])
            .optional(),
        ),
        (
            "page",
            SchemaNode::any()
                .optional()
                .describe("Cursor returned by a previous search"),
        ),
    ])
}

fn array_of(items: SchemaDescription) -> SchemaDescription {
    SchemaDescription {
        json_type: Some(JsonType::Array),
        items: Some(Box::new(items)),
        ..SchemaDescription::default()
    }
}

/// Input schema of one operation on one model, as shown by describe_model.
pub fn operation_input_schema(definition: &ModelDefinition, operation: &str) -> SchemaDescription {
    let id = || to_description(&id_argument());
    let fields = match operation {
        operations::SAVE => vec![("instance", definition.json_schema(), true)],
        operations::RETRIEVE | operations::DELETE => vec![("id", id(), true)],
        operations::SEARCH => vec![("search", to_description(&search_query_node()), false)],
        operations::BULK_INSERT => vec![("items", array_of(definition.json_schema()), true)],
        operations::BULK_DELETE => vec![("ids", array_of(id()), true)],
        _ => Vec::new(),
    };
    let model_type = SchemaDescription::of_type(JsonType::String)
        .describe(format!("Always '{}'", definition.model_type()));
    SchemaDescription::object(
        std::iter::once(("modelType", model_type, true)).chain(fields),
    )
}

pub fn list_models_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::LIST_MODELS,
        "List the data models of a domain with their model types and descriptions.",
        tool_input([(
            "domain",
            SchemaNode::string().describe("Name of the domain, as returned by list_domains"),
        )]),
        handle_list_models,
    )
}

pub fn describe_model_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::DESCRIBE_MODEL,
        "Describe a model: its fields and the input schema of each available operation.",
        tool_input([("modelType", model_type_argument())]),
        handle_describe_model,
    )
}

pub fn model_save_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_SAVE,
        "Create or replace an instance of a model. A missing primary key is generated.",
        tool_input([
            ("modelType", model_type_argument()),
            (
                "instance",
                open_object().describe("Instance data; see describe_model for its schema"),
            ),
        ]),
        handle_model_save,
    )
}

pub fn model_retrieve_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_RETRIEVE,
        "Retrieve an instance of a model by primary key.",
        tool_input([("modelType", model_type_argument()), ("id", id_argument())]),
        handle_model_retrieve,
    )
}

pub fn model_delete_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_DELETE,
        "Delete an instance of a model by primary key.",
        tool_input([("modelType", model_type_argument()), ("id", id_argument())]),
        handle_model_delete,
    )
}

pub fn model_search_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_SEARCH,
        "Search the instances of a model. Returns {instances, page}; pass page back to continue.",
        tool_input([
            ("modelType", model_type_argument()),
            ("search", search_query_node().optional()),
        ]),
        handle_model_search,
    )
}

pub fn model_bulk_insert_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_BULK_INSERT,
        "Validate and save several instances of a model. Nothing is saved if any item is invalid.",
        tool_input([
            ("modelType", model_type_argument()),
            ("items", SchemaNode::array(open_object())),
        ]),
        handle_model_bulk_insert,
    )
}

pub fn model_bulk_delete_tool(state: &ServerState) -> ToolDescriptor {
    builtin(
        state,
        names::MODEL_BULK_DELETE,
        "Delete several instances of a model by primary key. Unknown ids are ignored.",
        tool_input([
            ("modelType", model_type_argument()),
            ("ids", SchemaNode::array(SchemaNode::string())),
        ]),
        handle_model_bulk_delete,
    )
}
