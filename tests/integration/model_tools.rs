//! Model discovery and CRUD tools.

use crate::assert_error_envelope;
use crate::common::fixtures::{book, catalog, statement};
use crate::common::{call, call_ok, server, server_hiding};
use layers_mcp_server::{HideComponents, LayersMcpServer};
use serde_json::{Value, json};

const BOOK: &str = "library/Book";

async fn seeded() -> LayersMcpServer {
    let server = server();
    call_ok(
        &server,
        "model_bulk_insert",
        json!({"modelType": BOOK, "items": catalog()}),
    )
    .await;
    server
}

fn ids(result: &Value) -> Vec<&str> {
    result["instances"]
        .as_array()
        .map(|instances| {
            instances
                .iter()
                .filter_map(|instance| instance["id"].as_str())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_list_and_describe_models() {
    let server = server();
    let listed = call_ok(&server, "list_models", json!({"domain": "library"})).await;
    assert_eq!(
        listed,
        json!({"models": [{"modelType": BOOK, "description": "A book in the catalog"}]})
    );

    let described = call_ok(&server, "describe_model", json!({"modelType": BOOK})).await;
    assert_eq!(described["primaryKey"], "id");
    assert_eq!(described["schema"]["required"], json!(["title"]));
    let operations = described["operations"].as_object().unwrap();
    assert_eq!(operations.len(), 6);
    assert!(operations["save"]["inputSchema"].is_object());
}

#[tokio::test]
async fn test_domain_without_models() {
    let envelope = call(&server(), "list_models", json!({"domain": "billing"})).await;
    assert_error_envelope!(envelope, "MODELS_NOT_FOUND");
}

#[tokio::test]
async fn test_save_then_retrieve() {
    let server = server();
    let saved = call_ok(
        &server,
        "model_save",
        json!({"modelType": BOOK, "instance": {"title": "Solaris", "pages": 204}}),
    )
    .await;
    let id = saved["id"].as_str().expect("generated id").to_string();

    let envelope = call(
        &server,
        "model_retrieve",
        json!({"modelType": BOOK, "id": id}),
    )
    .await;
    assert!(!envelope.is_error());
    let retrieved = envelope.json().unwrap();
    assert_eq!(retrieved["title"], "Solaris");
    assert_eq!(
        envelope.structured_content.as_ref().map(|content| &content["pages"]),
        Some(&json!(204))
    );
}

#[tokio::test]
async fn test_save_reports_field_errors() {
    let envelope = call(
        &server(),
        "model_save",
        json!({"modelType": BOOK, "instance": {"pages": "many"}}),
    )
    .await;
    let error = assert_error_envelope!(envelope, "VALIDATION_ERROR");
    let details = &error["error"]["details"];
    assert_eq!(details["modelName"], "Book");
    assert_eq!(details["keysToErrors"]["title"], json!(["Required"]));
    assert!(details["keysToErrors"]["pages"].is_array());
}

#[tokio::test]
async fn test_bulk_delete_then_retrieve_returns_empty() {
    let server = server();
    call_ok(
        &server,
        "model_bulk_insert",
        json!({"modelType": BOOK, "items": [
            book("a", "First", "Anon", 10),
            book("b", "Second", "Anon", 20)
        ]}),
    )
    .await;

    let deleted = call(
        &server,
        "model_bulk_delete",
        json!({"modelType": BOOK, "ids": ["a", "b"]}),
    )
    .await;
    assert!(!deleted.is_error());

    let envelope = call(&server, "model_retrieve", json!({"modelType": BOOK, "id": "a"})).await;
    assert!(!envelope.is_error());
    assert_eq!(envelope.text(), "\"\"");
}

#[tokio::test]
async fn test_delete_single_instance() {
    let server = seeded().await;
    let envelope = call(&server, "model_delete", json!({"modelType": BOOK, "id": "b3"})).await;
    assert!(!envelope.is_error());

    let all = call_ok(&server, "model_search", json!({"modelType": BOOK})).await;
    assert_eq!(ids(&all).len(), 4);
    assert!(!ids(&all).contains(&"b3"));
}

#[tokio::test]
async fn test_search_filters_sorts_and_takes() {
    let server = seeded().await;
    let result = call_ok(
        &server,
        "model_search",
        json!({"modelType": BOOK, "search": {
            "query": [statement("author", json!("Frank Herbert"))],
            "sort": {"key": "pages", "order": "asc"},
            "take": 10
        }}),
    )
    .await;
    assert_eq!(ids(&result), vec!["b4", "b1"]);
    assert!(result.get("page").is_none());
}

#[tokio::test]
async fn test_search_with_or_and_comparison() {
    let server = seeded().await;
    let result = call_ok(
        &server,
        "model_search",
        json!({"modelType": BOOK, "search": {
            "query": [
                {"type": "property", "key": "pages", "value": 450, "valueType": "number", "equalitySymbol": ">"},
                "OR",
                statement("title", json!("Ubik"))
            ],
            "sort": {"key": "title", "order": "dsc"}
        }}),
    )
    .await;
    assert_eq!(ids(&result), vec!["b3", "b2"]);
}

#[tokio::test]
async fn test_search_pages_with_cursor() {
    let server = seeded().await;
    let search = |page: Option<Value>| {
        let mut search = json!({"sort": {"key": "title", "order": "asc"}, "take": 2});
        if let Some(page) = page {
            search["page"] = page;
        }
        json!({"modelType": BOOK, "search": search})
    };

    let first = call_ok(&server, "model_search", search(None)).await;
    assert_eq!(ids(&first), vec!["b5", "b1"]);
    let cursor = first["page"].clone();
    assert!(cursor.is_string());

    let second = call_ok(&server, "model_search", search(Some(cursor))).await;
    assert_eq!(ids(&second), vec!["b4", "b2"]);

    let last = call_ok(&server, "model_search", search(Some(second["page"].clone()))).await;
    assert_eq!(ids(&last), vec!["b3"]);
    assert!(last.get("page").is_none());
}

#[tokio::test]
async fn test_malformed_query_is_invalid() {
    let server = seeded().await;
    let envelope = call(
        &server,
        "model_search",
        json!({"modelType": BOOK, "search": {"query": ["AND", statement("title", json!("Dune"))]}}),
    )
    .await;
    let error = assert_error_envelope!(envelope, "INVALID_QUERY");
    assert!(error["error"]["details"].is_string());

    let envelope = call(
        &server,
        "model_search",
        json!({"modelType": BOOK, "search": {"page": "not-a-number"}}),
    )
    .await;
    assert_error_envelope!(envelope, "INVALID_QUERY");
}

#[tokio::test]
async fn test_bulk_insert_is_all_or_nothing() {
    let server = server();
    let envelope = call(
        &server,
        "model_bulk_insert",
        json!({"modelType": BOOK, "items": [
            book("ok", "Fine", "Anon", 1),
            {"id": "bad", "author": "Nobody"}
        ]}),
    )
    .await;
    let error = assert_error_envelope!(envelope, "VALIDATION_ERROR");
    assert_eq!(error["error"]["details"]["keysToErrors"]["1.title"], json!(["Required"]));

    let all = call_ok(&server, "model_search", json!({"modelType": BOOK})).await;
    assert!(ids(&all).is_empty());
}

#[tokio::test]
async fn test_unknown_and_hidden_models() {
    let server = server();
    for model_type in ["library/Loan", "nowhere/Book", "Book"] {
        let envelope = call(
            &server,
            "model_retrieve",
            json!({"modelType": model_type, "id": "x"}),
        )
        .await;
        assert_error_envelope!(envelope, "MODEL_NOT_FOUND");
    }

    let hidden = server_hiding(HideComponents::default().with_paths(["library.cruds.Book"]));
    let envelope = call(&hidden, "describe_model", json!({"modelType": BOOK})).await;
    assert_error_envelope!(envelope, "MODEL_NOT_FOUND");
    let envelope = call(&hidden, "list_models", json!({"domain": "library"})).await;
    assert_error_envelope!(envelope, "MODELS_NOT_FOUND");
}

#[tokio::test]
async fn test_hidden_operation() {
    let server =
        server_hiding(HideComponents::default().with_paths(["library.cruds.Book.delete"]));
    let envelope = call(&server, "model_delete", json!({"modelType": BOOK, "id": "b1"})).await;
    assert_error_envelope!(envelope, "OPERATION_NOT_FOUND");

    let described = call_ok(&server, "describe_model", json!({"modelType": BOOK})).await;
    let operations = described["operations"].as_object().unwrap();
    assert!(!operations.contains_key("delete"));
    assert!(operations.contains_key("bulkDelete"));
}

#[tokio::test]
async fn test_all_models_hidden() {
    let server = server_hiding(HideComponents::default().with_all_models(true));
    let envelope = call(&server, "model_search", json!({"modelType": BOOK})).await;
    let error = assert_error_envelope!(envelope, "TOOL_NOT_FOUND");
    assert_eq!(error["error"]["details"]["name"], "model_search");

    let features = call_ok(&server, "list_features", json!({"domain": "library"})).await;
    assert_eq!(features["features"].as_array().unwrap().len(), 2);
}
