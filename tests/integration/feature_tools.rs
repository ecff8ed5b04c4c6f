//! Domain and feature tools.

use crate::common::{call, call_ok, server, server_hiding};
use crate::{assert_error_code, assert_error_envelope};
use layers_mcp_server::HideComponents;
use layers_mcp_server::context::{RequestInfo, TransportExtras};
use serde_json::json;

#[tokio::test]
async fn test_list_domains_in_registration_order() {
    let result = call_ok(&server(), "list_domains", json!({})).await;
    let names: Vec<&str> = result["domains"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|domain| domain["name"].as_str())
        .collect();
    assert_eq!(names, vec!["library", "billing", "internal"]);
    assert_eq!(result["domains"][0]["description"], "Books and loans");
}

#[tokio::test]
async fn test_hidden_domain_is_not_listed_and_not_resolvable() {
    let server = server_hiding(HideComponents::default().with_domains(["internal"]));

    let result = call_ok(&server, "list_domains", json!({})).await;
    assert!(
        !result["domains"]
            .as_array()
            .unwrap()
            .iter()
            .any(|domain| domain["name"] == "internal")
    );

    let envelope = call(&server, "list_features", json!({"domain": "internal"})).await;
    assert_error_envelope!(envelope, "DOMAIN_NOT_FOUND");
}

#[tokio::test]
async fn test_list_features() {
    let result = call_ok(&server(), "list_features", json!({"domain": "billing"})).await;
    assert_eq!(
        result,
        json!({"features": [
            {"name": "createInvoice", "description": null},
            {"name": "listInvoices", "description": null}
        ]})
    );
}

#[tokio::test]
async fn test_describe_annotated_feature() {
    let result = call_ok(
        &server(),
        "describe_feature",
        json!({"domain": "library", "featureName": "greet"}),
    )
    .await;
    assert_eq!(result["description"], "Greet a member by name");
    assert_eq!(
        result["inputSchema"],
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"],
            "additionalProperties": false
        })
    );
    assert_eq!(result["outputSchema"], json!({"type": "string"}));
}

#[tokio::test]
async fn test_execute_annotated_feature() {
    let envelope = call(
        &server(),
        "execute_feature",
        json!({"domain": "library", "featureName": "greet", "args": {"name": "Ada"}}),
    )
    .await;
    assert!(!envelope.is_error());
    assert_eq!(envelope.text(), "\"Hello Ada\"");
    assert!(envelope.structured_content.is_none());
}

#[tokio::test]
async fn test_execute_rejects_invalid_feature_args() {
    let envelope = call(
        &server(),
        "execute_feature",
        json!({"domain": "library", "featureName": "greet", "args": {"name": 3}}),
    )
    .await;
    let error = assert_error_envelope!(envelope, "VALIDATION_ERROR");
    assert_eq!(error["error"]["details"]["modelName"], "greet");
    assert!(error["error"]["details"]["keysToErrors"].get("name").is_some());
}

#[tokio::test]
async fn test_hidden_feature_path() {
    let server =
        server_hiding(HideComponents::default().with_paths(["billing.createInvoice"]));

    let envelope = call(
        &server,
        "execute_feature",
        json!({"domain": "billing", "featureName": "createInvoice", "args": {}}),
    )
    .await;
    let error = assert_error_envelope!(envelope, "FEATURE_NOT_FOUND");
    assert_eq!(
        error,
        json!({"error": {"code": "FEATURE_NOT_FOUND", "message": "Feature not found"}})
    );

    let features = call_ok(&server, "list_features", json!({"domain": "billing"})).await;
    assert_eq!(features["features"].as_array().unwrap().len(), 1);
    assert_eq!(features["features"][0]["name"], "listInvoices");

    let listed = call_ok(&server, "list_domains", json!({})).await;
    assert!(
        listed["domains"]
            .as_array()
            .unwrap()
            .iter()
            .any(|domain| domain["name"] == "billing")
    );
}

#[tokio::test]
async fn test_plain_feature_passes_args_through() {
    let result = call_ok(
        &server(),
        "execute_feature",
        json!({"domain": "billing", "featureName": "createInvoice", "args": {"amount": 12}}),
    )
    .await;
    assert_eq!(result, json!({"invoice": {"amount": 12}}));
}

#[tokio::test]
async fn test_context_reaches_the_feature() {
    let extras = TransportExtras::new(RequestInfo::default().with_header("x-tenant", "acme"));
    let envelope = server()
        .execute_tool(
            "execute_feature",
            json!({
                "domain": "library",
                "featureName": "contextEcho",
                "crossLayerProps": {"locale": "en", "logging": {"ids": [{"traceId": "t-1"}]}},
                "args": {"crossLayerProps": {"locale": "fr"}}
            }),
            extras,
        )
        .await;
    let context = envelope.json().unwrap();

    assert_eq!(context["locale"], "fr");
    assert_eq!(context["requestInfo"]["headers"]["x-tenant"], "acme");
    let ids = context["logging"]["ids"].as_array().unwrap();
    assert_eq!(ids[0], json!({"traceId": "t-1"}));
    assert!(ids.last().unwrap()["requestId"].is_string());
}

#[tokio::test]
async fn test_unknown_feature_and_domain() {
    let server = server();
    let envelope = call(
        &server,
        "describe_feature",
        json!({"domain": "library", "featureName": "missing"}),
    )
    .await;
    assert_error_envelope!(envelope, "FEATURE_NOT_FOUND");

    let envelope = call(&server, "list_features", json!({"domain": "nowhere"})).await;
    let error = envelope.json().unwrap();
    assert_error_code!(error, "DOMAIN_NOT_FOUND");
}
