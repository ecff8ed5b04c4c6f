//! Common test utilities.
//!
//! Provides a small multi-domain fixture, helpers to call tools and read their
//! envelopes, and assertion macros for error results.

use layers_mcp_server::context::{CrossCallContext, TransportExtras};
use layers_mcp_server::{
    Domain, DomainRegistry, Envelope, Feature, FeatureSchema, FieldDefinition, FieldKind,
    HideComponents, LayersMcpServer, McpServerConfig, MemoryModelCruds, ModelDefinition,
    SchemaNode,
};
use serde_json::{Value, json};

pub mod fixtures;

/// Assert that a JSON value is an `{"error": {...}}` object with the given code.
#[macro_export]
macro_rules! assert_error_code {
    ($value:expr, $code:expr) => {{
        let value: &serde_json::Value = &$value;
        assert_eq!(
            value["error"]["code"], $code,
            "expected error code {} in {}",
            $code, value
        );
    }};
}

/// Assert that an envelope is an error envelope with the given code and
/// return its parsed error object.
#[macro_export]
macro_rules! assert_error_envelope {
    ($envelope:expr, $code:expr) => {{
        let envelope: &layers_mcp_server::Envelope = &$envelope;
        assert!(envelope.is_error(), "expected an error envelope, got {:?}", envelope);
        let value = envelope.json().expect("error envelope carries JSON text");
        $crate::assert_error_code!(value, $code);
        value
    }};
}

/// The `library` domain: one annotated and one plain feature, a Book model.
pub fn library_domain() -> Domain {
    let greet = Feature::annotated(
        FeatureSchema::new(
            SchemaNode::object([("name", SchemaNode::string())]),
            SchemaNode::string(),
        )
        .describe("Greet a member by name"),
        |args: Value, _context| async move {
            Ok(json!(format!("Hello {}", args["name"].as_str().unwrap_or_default())))
        },
    );
    let context_echo = Feature::plain(|_args: Value, context: CrossCallContext| async move {
        Ok(context.to_value())
    })
    .describe("Return the call context");

    Domain::new("library")
        .with_description("Books and loans")
        .with_feature("greet", greet)
        .with_feature("contextEcho", context_echo)
        .with_model(MemoryModelCruds::new(book_definition()))
}

pub fn book_definition() -> ModelDefinition {
    ModelDefinition::new("library", "Book")
        .with_description("A book in the catalog")
        .with_field(FieldDefinition::new("title", FieldKind::text()).required())
        .with_field(FieldDefinition::new("author", FieldKind::text()))
        .with_field(FieldDefinition::new("pages", FieldKind::integer()))
}

/// The `billing` domain: a single feature, used for path hiding.
pub fn billing_domain() -> Domain {
    Domain::new("billing")
        .with_description("Invoices")
        .with_feature(
            "createInvoice",
            Feature::plain(|args: Value, _context| async move {
                Ok(json!({ "invoice": args }))
            }),
        )
        .with_feature(
            "listInvoices",
            Feature::plain(|_args: Value, _context| async move { Ok(json!([])) }),
        )
}

/// The `internal` domain: registered features that should never be listed when hidden.
pub fn internal_domain() -> Domain {
    Domain::new("internal").with_feature(
        "purge",
        Feature::plain(|_args: Value, _context| async move { Ok(json!({"purged": true})) }),
    )
}

pub fn registry() -> DomainRegistry {
    let mut registry = DomainRegistry::new();
    for domain in [library_domain(), billing_domain(), internal_domain()] {
        registry.register(domain).expect("fixture domains are unique");
    }
    registry
}

pub fn config() -> McpServerConfig {
    McpServerConfig::new("test-system", "0.1.0").with_description("Fixture system")
}

pub fn server() -> LayersMcpServer {
    LayersMcpServer::new(config(), registry())
}

pub fn server_hiding(hide: HideComponents) -> LayersMcpServer {
    LayersMcpServer::new(config().with_hide_components(hide), registry())
}

/// Call a tool with default transport extras.
pub async fn call(server: &LayersMcpServer, tool: &str, arguments: Value) -> Envelope {
    server
        .execute_tool(tool, arguments, TransportExtras::default())
        .await
}

/// Call a tool that must succeed and return its parsed result.
pub async fn call_ok(server: &LayersMcpServer, tool: &str, arguments: Value) -> Value {
    let envelope = call(server, tool, arguments).await;
    assert!(
        !envelope.is_error(),
        "{} failed: {}",
        tool,
        envelope.text()
    );
    envelope.json().unwrap_or(Value::Null)
}
