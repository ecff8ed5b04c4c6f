//! Complete MCP Stdio Server Demo
//!
//! Runs a small library system as an MCP stdio server. The `library` domain
//! has two features and two models; the `maintenance` domain is hidden from
//! agents.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --example stdio_server
//! ```
//!
//! The server speaks MCP over stdin/stdout through the `rmcp` SDK.
//! Logs go to stderr.
//!
//! ## Example MCP Messages
//!
//! ### Initialize the server:
//! ```json
//! {"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{},"clientInfo":{"name":"test-client","version":"1.0.0"}}}
//! ```
//!
//! ### List available tools:
//! ```json
//! {"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}
//! ```
//!
//! ### Save a book:
//! ```json
//! {"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"model_save","arguments":{"modelType":"library/Book","instance":{"title":"Dune","author":"Frank Herbert","pages":412}}}}
//! ```
//!
//! ### Run a feature:
//! ```json
//! {"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"execute_feature","arguments":{"domain":"library","featureName":"loanPeriod","args":{"memberLevel":"gold"}}}}
//! ```

use layers_mcp_server::{
    Domain, DomainRegistry, ExampleOfUse, Feature, FeatureSchema, FieldDefinition, FieldKind,
    HideComponents, LayersMcpServer, McpServerConfig, MemoryModelCruds, ModelDefinition,
    SchemaNode, StartHereConfig, ToolError,
};
use serde_json::{Value, json};

fn library_domain() -> Domain {
    let book = ModelDefinition::new("library", "Book")
        .with_description("A title held by the library")
        .with_field(FieldDefinition::new("title", FieldKind::text()).required())
        .with_field(FieldDefinition::new("author", FieldKind::text()).required())
        .with_field(FieldDefinition::new("pages", FieldKind::integer()))
        .with_field(
            FieldDefinition::new("genre", FieldKind::enumeration(["fiction", "nonfiction"]))
                .describe("Shelf section"),
        );
    let loan = ModelDefinition::new("library", "Loan")
        .with_description("A book lent to a member")
        .with_field(FieldDefinition::new("bookId", FieldKind::foreign_key("library/Book")).required())
        .with_field(FieldDefinition::new("member", FieldKind::text()).required())
        .with_field(FieldDefinition::new("due", FieldKind::Datetime));

    let loan_period = Feature::annotated(
        FeatureSchema::new(
            SchemaNode::object([(
                "memberLevel",
                SchemaNode::enumeration(["standard", "gold"]).describe("Membership level"),
            )]),
            SchemaNode::object([("days", SchemaNode::integer())]),
        )
        .describe("Loan period in days for a membership level"),
        |args: Value, context: layers_mcp_server::context::CrossCallContext| async move {
            log::debug!("loanPeriod called with request id {:?}", context.request_id());
            let days = match args["memberLevel"].as_str() {
                Some("gold") => 28,
                _ => 14,
            };
            Ok(json!({ "days": days }))
        },
    );

    let overdue_fee = Feature::plain(|args: Value, _context| async move {
        let days_late = args["daysLate"]
            .as_i64()
            .ok_or_else(|| ToolError::message("daysLate must be an integer"))?;
        Ok(json!({ "fee": (days_late.max(0) as f64) * 0.25 }))
    })
    .describe("Fee owed for a late return. Takes {daysLate: integer}.");

    Domain::new("library")
        .with_description("Books, loans and lending rules")
        .with_feature("loanPeriod", loan_period)
        .with_feature("overdueFee", overdue_fee)
        .with_model(MemoryModelCruds::new(book))
        .with_model(MemoryModelCruds::new(loan))
}

fn maintenance_domain() -> Domain {
    Domain::new("maintenance")
        .with_description("Operator-only tasks")
        .with_feature(
            "reindex",
            Feature::plain(|_args: Value, _context| async move { Ok(json!({"reindexed": true})) }),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let mut domains = DomainRegistry::new();
    domains.register(library_domain())?;
    domains.register(maintenance_domain())?;

    let config = McpServerConfig::new("library-system", env!("CARGO_PKG_VERSION"))
        .with_description("A lending library: catalog, loans and lending rules")
        .with_hide_components(
            HideComponents::default()
                .with_domains(["maintenance"])
                .with_paths(["library.cruds.Loan.bulkDelete"]),
        )
        .with_start_here(StartHereConfig {
            include_domains: true,
            include_features: true,
            examples_of_use: vec![
                ExampleOfUse::new("Find long books", "Search books with more than 400 pages")
                    .with_tool_calls(vec![json!({
                        "name": "model_search",
                        "arguments": {
                            "modelType": "library/Book",
                            "search": {"query": [{"key": "pages", "value": 400, "equalitySymbol": ">"}]}
                        }
                    })]),
            ],
            ..StartHereConfig::default()
        });

    let mut server = LayersMcpServer::new(config, domains)
        .with_request_log_data(|call| json!({ "argumentKeys": call.arguments.as_object().map(|o| o.len()) }));

    server.add_json_schema_tool(
        "echo",
        "Echo the arguments back",
        json!({
            "type": "object",
            "properties": {"message": {"type": "string"}},
            "required": ["message"]
        }),
        |args: Value, _context| async move { Ok(args) },
    )?;

    let tools = server.get_tools()?;
    eprintln!("Available MCP Tools ({} total):", tools.len());
    for (i, tool) in tools.iter().enumerate() {
        let name = tool["name"].as_str().unwrap_or("Unknown");
        let description = tool["description"].as_str().unwrap_or("No description");
        eprintln!("{}. {} - {}", i + 1, name, description);
    }
    eprintln!();

    server.start().await?;
    Ok(())
}
