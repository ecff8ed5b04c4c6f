//! The START_HERE overview.

use crate::common::{call_ok, config, registry, server, server_hiding};
use layers_mcp_server::{ExampleOfUse, HideComponents, LayersMcpServer, StartHereConfig};
use serde_json::{Value, json};

fn entry_tools(overview: &Value) -> Vec<&str> {
    overview["systemEntries"]
        .as_array()
        .map(|entries| entries.iter().filter_map(|entry| entry["tool"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_default_overview() {
    let overview = call_ok(&server(), "START_HERE", json!({})).await;
    assert_eq!(overview["name"], "test-system");
    assert_eq!(overview["version"], "0.1.0");
    assert_eq!(overview["description"], "Fixture system");
    assert!(entry_tools(&overview).contains(&"list_domains"));
    assert!(entry_tools(&overview).contains(&"list_models"));
    assert!(overview.get("domains").is_none());
    assert!(overview.get("examplesOfUse").is_none());
}

#[tokio::test]
async fn test_model_entries_drop_when_models_are_hidden() {
    let server = server_hiding(HideComponents::default().with_all_models(true));
    let overview = call_ok(&server, "START_HERE", json!({})).await;
    let tools = entry_tools(&overview);
    assert!(tools.contains(&"execute_feature"));
    assert!(!tools.iter().any(|tool| tool.starts_with("list_models") || tool.starts_with("model_")));
}

#[tokio::test]
async fn test_configured_overview_lists_visible_features() {
    let start_here = StartHereConfig {
        name: Some("Library Desk".to_string()),
        hide_default_system_entries: true,
        include_features: true,
        examples_of_use: vec![
            ExampleOfUse::new("Greet", "Say hello to a member").with_tool_calls(vec![json!({
                "tool": "execute_feature",
                "arguments": {"domain": "library", "featureName": "greet", "args": {"name": "Ada"}}
            })]),
        ],
        ..StartHereConfig::default()
    };
    let server = LayersMcpServer::new(
        config()
            .with_start_here(start_here)
            .with_hide_components(
                HideComponents::default()
                    .with_domains(["internal"])
                    .with_paths(["billing.createInvoice"]),
            ),
        registry(),
    );

    let overview = call_ok(&server, "START_HERE", json!({})).await;
    assert_eq!(overview["name"], "Library Desk");
    assert!(overview.get("systemEntries").is_none());

    let domains = overview["domains"].as_array().unwrap();
    let names: Vec<&str> = domains.iter().filter_map(|domain| domain["name"].as_str()).collect();
    assert_eq!(names, vec!["library", "billing"]);
    assert_eq!(domains[1]["features"], json!([{"name": "listInvoices", "description": null}]));

    assert_eq!(overview["examplesOfUse"][0]["name"], "Greet");
    assert_eq!(overview["examplesOfUse"][0]["toolCalls"][0]["tool"], "execute_feature");
}

#[tokio::test]
async fn test_include_domains_without_features() {
    let start_here = StartHereConfig {
        include_domains: true,
        ..StartHereConfig::default()
    };
    let server = LayersMcpServer::new(config().with_start_here(start_here), registry());
    let overview = call_ok(&server, "START_HERE", json!({})).await;
    let domains = overview["domains"].as_array().unwrap();
    assert_eq!(domains.len(), 3);
    assert!(domains.iter().all(|domain| domain.get("features").is_none()));
}
