//! The gateway's own MCP server, spoken over the host agent's stdio.
//!
//! Each request runs on its own task so a slow subordinate never blocks a
//! `list_available_mcps` call. Responses funnel through one channel into a
//! single writer, which keeps every output line a whole JSON-RPC frame.
//! EOF on input stops reading; the server returns once in-flight requests
//! have been answered.

pub mod tools;

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::gateway::Gateway;
use crate::protocol::{
    IncomingMessage, JsonRpcError, JsonRpcResponse, MCP_PROTOCOL_VERSION, MessageKind,
    SUPPORTED_PROTOCOL_VERSIONS, error_codes,
};
use tools::GatewayCall;

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "DCL Master MCP";

/// MCP server exposing a [`Gateway`] as four tools.
#[derive(Clone)]
pub struct GatewayServer {
    gateway: Arc<Gateway>,
}

impl GatewayServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message = match serde_json::from_str::<IncomingMessage>(trimmed) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparsable request from host");
                    let _ = tx.send(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
                    continue;
                }
            };

            match message.kind() {
                MessageKind::Request { .. } => {
                    let server = self.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let response = server.handle_request(message).await;
                        let _ = tx.send(response);
                    });
                }
                MessageKind::Notification(method) => {
                    tracing::debug!(method, "Host notification");
                }
                MessageKind::Response(id) => {
                    tracing::debug!(id = %id, "Ignoring response from host");
                }
                MessageKind::Invalid => {
                    let error = JsonRpcError::new(error_codes::INVALID_REQUEST, "Invalid Request");
                    let _ = tx.send(JsonRpcResponse::error(Value::Null, error));
                }
            }
        }

        tracing::info!("Host closed input, draining in-flight requests");
        // The writer ends once every request task has dropped its sender
        drop(tx);
        writer_task.await.map_err(std::io::Error::other)?
    }

    /// Answer one request.
    pub async fn handle_request(&self, message: IncomingMessage) -> JsonRpcResponse {
        let id = message.id.unwrap_or(Value::Null);
        let method = message.method.unwrap_or_default();

        match method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(message.params.as_ref())),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tools::definitions() })),
            "tools/call" => match GatewayCall::parse(message.params) {
                Ok(call) => {
                    tracing::debug!(call = ?call, "Gateway tool call");
                    let text = call.execute(&self.gateway).await;
                    JsonRpcResponse::success(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": text }],
                            "isError": false
                        }),
                    )
                }
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string())),
            },
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        }
    }
}

/// Echo the host's protocol version when supported, otherwise offer ours.
fn initialize_result(params: Option<&Value>) -> Value {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let version = match requested {
        Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
        _ => MCP_PROTOCOL_VERSION,
    };

    if let Some(client) = params.and_then(|p| p.get("clientInfo")) {
        tracing::info!(client = %client, protocol_version = version, "Host connected");
    }

    json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
