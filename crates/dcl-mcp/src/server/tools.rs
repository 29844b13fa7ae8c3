//! The four tools the gateway exposes to its host agent.

use dcl_core::McpTool;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::gateway::Gateway;

pub const LIST_AVAILABLE_MCPS: &str = "list_available_mcps";
pub const LOAD_MCP_TOOLS: &str = "load_mcp_tools";
pub const CALL_MCP_TOOL: &str = "call_mcp_tool";
pub const GET_VERSION: &str = "get_version";

/// Tool definitions returned from `tools/list`.
pub fn definitions() -> Vec<McpTool> {
    vec![
        McpTool::new(LIST_AVAILABLE_MCPS)
            .with_description(
                "List all available MCP servers and their capabilities. \
                 Use this first to see what tools are available before loading specific tools.",
            )
            .with_input_schema(json!({ "type": "object", "properties": {} })),
        McpTool::new(LOAD_MCP_TOOLS)
            .with_description(
                "Load and list available tools from a specific MCP server. \
                 Use list_available_mcps first to see the server names.",
            )
            .with_input_schema(json!({
                "type": "object",
                "properties": {
                    "mcp_name": { "type": "string", "description": "Name of the MCP server" }
                },
                "required": ["mcp_name"]
            })),
        McpTool::new(CALL_MCP_TOOL)
            .with_description("Call a specific tool from an MCP server.")
            .with_input_schema(json!({
                "type": "object",
                "properties": {
                    "mcp_name": { "type": "string", "description": "Name of the MCP server" },
                    "tool_name": { "type": "string", "description": "Name of the tool to call" },
                    "arguments": {
                        "type": "object",
                        "description": "Arguments to pass to the tool (optional)",
                        "additionalProperties": true
                    }
                },
                "required": ["mcp_name", "tool_name"]
            })),
        McpTool::new(GET_VERSION)
            .with_description("Get DCL Wrapper version information.")
            .with_input_schema(json!({ "type": "object", "properties": {} })),
    ]
}

/// Rejected `tools/call` request; reported as JSON-RPC invalid params.
#[derive(Debug, Error)]
pub enum CallParseError {
    #[error("Missing tools/call params")]
    MissingParams,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LoadArgs {
    mcp_name: String,
}

#[derive(Debug, Deserialize)]
struct CallArgs {
    mcp_name: String,
    tool_name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

/// A parsed gateway tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    ListCatalog,
    LoadServer {
        mcp_name: String,
    },
    CallTool {
        mcp_name: String,
        tool_name: String,
        arguments: Option<Map<String, Value>>,
    },
    Version,
}

impl GatewayCall {
    /// Parse `tools/call` params into a gateway call.
    pub fn parse(params: Option<Value>) -> Result<Self, CallParseError> {
        let params = params.ok_or(CallParseError::MissingParams)?;
        let CallParams { name, arguments } =
            serde_json::from_value(params).map_err(|source| CallParseError::InvalidArguments {
                tool: "tools/call".to_string(),
                source,
            })?;
        let arguments = arguments.unwrap_or_else(|| Value::Object(Map::new()));
        let invalid = |source| CallParseError::InvalidArguments {
            tool: name.clone(),
            source,
        };

        match name.as_str() {
            LIST_AVAILABLE_MCPS => Ok(Self::ListCatalog),
            GET_VERSION => Ok(Self::Version),
            LOAD_MCP_TOOLS => {
                let args: LoadArgs = serde_json::from_value(arguments).map_err(invalid)?;
                Ok(Self::LoadServer {
                    mcp_name: args.mcp_name,
                })
            }
            CALL_MCP_TOOL => {
                let args: CallArgs = serde_json::from_value(arguments).map_err(invalid)?;
                Ok(Self::CallTool {
                    mcp_name: args.mcp_name,
                    tool_name: args.tool_name,
                    arguments: args.arguments,
                })
            }
            _ => Err(CallParseError::UnknownTool(name)),
        }
    }

    /// Run the call and return the text shown to the host agent.
    pub async fn execute(self, gateway: &Gateway) -> String {
        match self {
            Self::ListCatalog => gateway.list_catalog(),
            Self::LoadServer { mcp_name } => gateway.load_server(&mcp_name).await,
            Self::CallTool {
                mcp_name,
                tool_name,
                arguments,
            } => {
                gateway
                    .invoke_operation(&mcp_name, &tool_name, arguments)
                    .await
            }
            Self::Version => Gateway::version(),
        }
    }
}
