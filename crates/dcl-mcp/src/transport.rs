//! JSON-RPC over stdio transport.
//!
//! Handles low-level communication with a subordinate server:
//! - Writing JSON-RPC requests and notifications to its stdin
//! - Reading lines from its stdout until the matching response arrives
//! - Answering server-initiated `ping` requests while waiting

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::client::McpClientError;
use crate::protocol::{
    IncomingMessage, JsonRpcError, JsonRpcRequest, JsonRpcResponse, MessageKind,
};

/// Bi-directional JSON-RPC transport over a line-oriented byte stream.
///
/// Request ids are per-transport and start at 1.
pub struct StdioTransport<R, W> {
    server_name: String,
    writer: Mutex<W>,
    reader: Mutex<R>,
    next_id: AtomicU64,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a new transport from a buffered reader and a writer.
    pub fn new(server_name: &str, reader: R, writer: W) -> Self {
        Self {
            server_name: server_name.to_string(),
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Send a JSON-RPC request and wait for the response with the same id.
    ///
    /// Lines that are not JSON (e.g., npx banners), responses to other ids,
    /// and notifications are skipped.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<JsonRpcResponse, McpClientError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        self.write_message(&request).await?;

        let mut reader = self.reader.lock().await;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(McpClientError::Closed);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Ok(message) = serde_json::from_str::<IncomingMessage>(trimmed) else {
                tracing::debug!(
                    server_name = %self.server_name,
                    line = trimmed,
                    "Skipping non-JSON-RPC output"
                );
                continue;
            };

            match message.kind() {
                MessageKind::Response(response_id) if response_id.as_u64() == Some(id) => {
                    return Ok(message.into_response());
                }
                MessageKind::Response(response_id) => {
                    tracing::debug!(
                        server_name = %self.server_name,
                        expected = id,
                        received = %response_id,
                        "Skipping response for another request"
                    );
                }
                MessageKind::Request { id: peer_id, method } => {
                    self.answer_peer_request(peer_id.clone(), method).await?;
                }
                MessageKind::Notification(method) => {
                    tracing::trace!(
                        server_name = %self.server_name,
                        method,
                        "Ignoring server notification"
                    );
                }
                MessageKind::Invalid => {
                    tracing::debug!(
                        server_name = %self.server_name,
                        line = trimmed,
                        "Skipping message with neither id nor method"
                    );
                }
            }
        }
    }

    /// Send a JSON-RPC notification (no response expected).
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpClientError> {
        self.write_message(&JsonRpcRequest::notification(method, params))
            .await
    }

    /// Reply to a request the subordinate sent us while we wait for a response.
    async fn answer_peer_request(&self, id: Value, method: &str) -> Result<(), McpClientError> {
        let response = if method == "ping" {
            JsonRpcResponse::success(id, json!({}))
        } else {
            tracing::debug!(
                server_name = %self.server_name,
                method,
                "Rejecting unsupported server-initiated request"
            );
            JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
        };
        self.write_message(&response).await
    }

    async fn write_message<T: serde::Serialize + Sync>(
        &self,
        message: &T,
    ) -> Result<(), McpClientError> {
        let mut json = serde_json::to_string(message)?;
        json.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Extract the result from a JSON-RPC response, converting errors to `McpClientError`.
pub fn extract_result(response: JsonRpcResponse) -> Result<Value, McpClientError> {
    if let Some(err) = response.error {
        return Err(McpClientError::ServerError {
            code: err.code,
            message: err.message,
        });
    }

    response.result.ok_or_else(|| {
        McpClientError::ProtocolError("response missing both result and error".to_string())
    })
}
