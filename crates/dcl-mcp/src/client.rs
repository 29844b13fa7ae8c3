//! MCP JSON-RPC client for talking to one subordinate server.
//!
//! Implements the client half of the MCP protocol over a [`StdioTransport`]:
//! the `initialize` handshake, `tools/list` and `tools/call`.

use dcl_core::{McpTool, OperationResult};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::protocol::MCP_PROTOCOL_VERSION;
use crate::transport::{StdioTransport, extract_result};

/// Upper bound on `tools/list` pages followed for one listing.
const MAX_TOOL_PAGES: usize = 100;

/// Errors that can occur during MCP client operations.
#[derive(Debug, Error)]
pub enum McpClientError {
    #[error("Failed to communicate with MCP server: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("MCP protocol error: {0}")]
    ProtocolError(String),

    #[error("MCP server returned error: code={code}, message={message}")]
    ServerError { code: i64, message: String },

    #[error("Server closed connection (stdout reached EOF; the process may have exited)")]
    Closed,
}

/// MCP initialize result.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo", default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub capabilities: Value,
}

/// Server information from initialize.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolsPage {
    #[serde(default)]
    tools: Vec<McpTool>,
    #[serde(default, rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolResponse {
    #[serde(default)]
    content: Vec<Value>,
    #[serde(default, rename = "structuredContent")]
    structured_content: Option<Value>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

/// Client for one subordinate MCP server.
pub struct McpClient<R, W> {
    transport: StdioTransport<R, W>,
}

impl<R, W> McpClient<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a client over an already-connected stream. No messages are sent.
    pub fn new(server_name: &str, reader: R, writer: W) -> Self {
        Self {
            transport: StdioTransport::new(server_name, reader, writer),
        }
    }

    pub fn server_name(&self) -> &str {
        self.transport.server_name()
    }

    /// Perform the `initialize` handshake and send `notifications/initialized`.
    pub async fn initialize(&self) -> Result<InitializeResult, McpClientError> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "clientInfo": {
                "name": "dcl",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {}
        });

        let response = self.transport.request("initialize", Some(params)).await?;
        let result: InitializeResult = serde_json::from_value(extract_result(response)?)?;

        self.transport
            .notify("notifications/initialized", None)
            .await?;

        tracing::debug!(
            server_name = %self.server_name(),
            protocol_version = %result.protocol_version,
            remote = ?result.server_info.as_ref().map(|info| info.name.as_str()),
            "MCP session initialized"
        );

        Ok(result)
    }

    /// List every tool the server declares, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let response = self.transport.request("tools/list", params).await?;
            let page: ToolsPage = serde_json::from_value(extract_result(response)?)?;

            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        Err(McpClientError::ProtocolError(format!(
            "tools/list did not finish after {MAX_TOOL_PAGES} pages"
        )))
    }

    /// Call a tool, passing `arguments` through unvalidated.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<OperationResult, McpClientError> {
        let params = json!({
            "name": name,
            "arguments": arguments
        });

        let response = self.transport.request("tools/call", Some(params)).await?;
        let result: CallToolResponse = serde_json::from_value(extract_result(response)?)?;

        // Only text items carry text; images, audio and resources are skipped
        let text = result
            .content
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        Ok(OperationResult::new(text, result.structured_content).with_error_flag(result.is_error))
    }
}
