//! MCP sessions over in-memory pipes, driven by an SDK client and by raw lines.

use crate::common::{config, registry, server};
use layers_mcp_server::{LayersMcpServer, McpResult};
use rmcp::model::CallToolRequestParam;
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

type Client = RunningService<RoleClient, ()>;

fn spawn_session(server: LayersMcpServer, stream: tokio::io::DuplexStream) -> JoinHandle<McpResult<()>> {
    let (read, write) = tokio::io::split(stream);
    tokio::spawn(async move { server.serve(read, write).await })
}

async fn connect(server: LayersMcpServer) -> (Client, JoinHandle<McpResult<()>>) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let serving = spawn_session(server, server_io);
    let client = ().serve(client_io).await.expect("handshake completes");
    (client, serving)
}

async fn call(client: &Client, name: &str, arguments: Value) -> Value {
    let request: CallToolRequestParam =
        serde_json::from_value(json!({"name": name, "arguments": arguments})).unwrap();
    serde_json::to_value(client.call_tool(request).await.expect("tools/call succeeds")).unwrap()
}

#[tokio::test]
async fn test_handshake_list_and_call() {
    let (client, serving) = connect(server()).await;

    let info = serde_json::to_value(client.peer_info()).unwrap();
    assert_eq!(info["serverInfo"]["name"], "test-system");
    assert_eq!(info["instructions"], "Fixture system");

    let tools = client.list_all_tools().await.unwrap();
    assert_eq!(tools.len(), 13);
    assert_eq!(tools[0].name, "START_HERE");
    let execute = tools.iter().find(|tool| tool.name == "execute_feature").unwrap();
    assert!(execute.input_schema.contains_key("properties"));

    let result = call(
        &client,
        "execute_feature",
        json!({"domain": "library", "featureName": "greet", "args": {"name": "Ada"}}),
    )
    .await;
    assert_eq!(result["content"][0]["text"], "\"Hello Ada\"");

    client.cancel().await.unwrap();
    serving.await.unwrap().expect("session ends cleanly");
}

#[tokio::test]
async fn test_tool_errors_stay_inside_the_result() {
    let (client, serving) = connect(server()).await;

    let result = call(
        &client,
        "model_retrieve",
        json!({"modelType": "library/Nothing", "id": "x"}),
    )
    .await;
    assert_eq!(result["isError"], true);
    let error: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(error["error"]["code"], "MODEL_NOT_FOUND");

    client.cancel().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_stateful_session_keeps_model_data() {
    let (client, serving) = connect(LayersMcpServer::new(config().stateful(), registry())).await;

    call(
        &client,
        "model_save",
        json!({"modelType": "library/Book", "instance": {"id": "s1", "title": "Kindred"}}),
    )
    .await;
    let result = call(
        &client,
        "model_retrieve",
        json!({"modelType": "library/Book", "id": "s1"}),
    )
    .await;
    assert_eq!(result["structuredContent"]["title"], "Kindred");

    client.cancel().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_replies_echo_zero_and_string_ids_and_skip_notifications() {
    let (client, server_end) = tokio::io::duplex(64 * 1024);
    let serving = spawn_session(server(), server_end);
    let (client_read, mut client_write) = tokio::io::split(client);

    let requests = [
        json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "line-client", "version": "0"}
        }}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}),
        json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}),
    ];
    for request in &requests {
        let mut line = request.to_string();
        line.push('\n');
        client_write.write_all(line.as_bytes()).await.unwrap();
    }

    let mut lines = BufReader::new(client_read).lines();
    let mut replies = HashMap::new();
    while replies.len() < 3 {
        let line = lines.next_line().await.unwrap().expect("reply line");
        let reply: Value = serde_json::from_str(&line).unwrap();
        assert!(reply.get("id").is_some(), "only requests get replies: {}", reply);
        replies.insert(reply["id"].to_string(), reply);
    }
    client_write.shutdown().await.unwrap();
    drop(lines);

    assert_eq!(replies["0"]["result"]["serverInfo"]["name"], "test-system");
    assert_eq!(replies["\"p\""]["result"], json!({}));
    assert_eq!(replies["7"]["result"]["tools"].as_array().unwrap().len(), 13);

    serving.await.unwrap().expect("session ends at EOF");
}
