//! The gateway's MCP server driven over in-memory stdio.

#![cfg(unix)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{echo_script, fast_config, gateway, script_server, test_env};
use dcl_core::Registry;
use dcl_mcp::GatewayServer;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};

/// Feed `requests` to a fresh server, close input, and collect every reply.
async fn exchange(requests: &[Value], raw: &[&str]) -> Vec<Value> {
    let registry =
        Registry::new().with_server(script_server("echo", "test echo server", &echo_script()));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());
    let server = GatewayServer::new(Arc::new(gateway));

    let (mut host_in, server_in) = duplex(64 * 1024);
    let (server_out, host_out) = duplex(64 * 1024);

    let serve = tokio::spawn(async move { server.serve(BufReader::new(server_in), server_out).await });

    for request in requests {
        host_in
            .write_all(format!("{request}\n").as_bytes())
            .await
            .unwrap();
    }
    for line in raw {
        host_in.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    }
    drop(host_in);

    let mut replies = Vec::new();
    let mut lines = BufReader::new(host_out).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        replies.push(serde_json::from_str(&line).unwrap());
    }

    serve.await.unwrap().unwrap();
    replies
}

fn by_id(replies: Vec<Value>) -> HashMap<String, Value> {
    replies
        .into_iter()
        .map(|reply| (reply["id"].to_string(), reply))
        .collect()
}

fn call(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    })
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let replies = by_id(
        exchange(
            &[
                json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
                       "params": {"protocolVersion": "2025-06-18", "clientInfo": {"name": "host"}, "capabilities": {}}}),
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
                json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
            ],
            &[],
        )
        .await,
    );

    // The notification gets no reply
    assert_eq!(replies.len(), 3);
    assert_eq!(replies["1"]["result"]["serverInfo"]["name"], "DCL Master MCP");
    assert_eq!(replies["1"]["result"]["protocolVersion"], "2025-06-18");

    let tools: Vec<&str> = replies["2"]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        tools,
        vec!["list_available_mcps", "load_mcp_tools", "call_mcp_tool", "get_version"]
    );
    assert_eq!(replies["3"]["result"], json!({}));
}

#[tokio::test]
async fn test_gateway_tools_return_text_content() {
    let replies = by_id(
        exchange(
            &[
                call(10, "list_available_mcps", json!({})),
                call(11, "load_mcp_tools", json!({"mcp_name": "echo"})),
                call(12, "call_mcp_tool", json!({"mcp_name": "echo", "tool_name": "ping", "arguments": {}})),
                call(13, "get_version", json!({})),
                call(14, "load_mcp_tools", json!({"mcp_name": "missing"})),
            ],
            &[],
        )
        .await,
    );

    let text = |id: &str| {
        let result = &replies[id]["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        result["content"][0]["text"].as_str().unwrap().to_string()
    };

    assert!(text("10").contains("[MCP] echo"));
    assert!(text("11").contains("[TOOL] ping"));
    assert_eq!(text("12"), "pong");
    assert!(text("13").starts_with("DCL Wrapper v"));
    assert!(text("14").starts_with("[ERROR] Unknown MCP server: missing"));
}

#[tokio::test]
async fn test_protocol_errors() {
    let replies = exchange(
        &[
            call(20, "not_a_tool", json!({})),
            call(21, "load_mcp_tools", json!({})),
            json!({"jsonrpc": "2.0", "id": 22, "method": "resources/list"}),
        ],
        &["this is not json"],
    )
    .await;

    let code = |id: Value| {
        replies
            .iter()
            .find(|r| r["id"] == id)
            .map(|r| r["error"]["code"].clone())
            .unwrap()
    };
    assert_eq!(code(json!(20)), json!(-32602));
    assert_eq!(code(json!(21)), json!(-32602));
    assert_eq!(code(json!(22)), json!(-32601));
    assert_eq!(code(Value::Null), json!(-32700));
}
