//! Capability listing: which operations a subordinate offers.

use std::fmt::Write as _;

use dcl_core::{GatewayError, McpTool};

use crate::session::Session;

/// Fetch the subordinate's operations in the order it declares them.
pub async fn list_operations(session: &Session) -> Result<Vec<McpTool>, GatewayError> {
    let tools = session.list_tools().await?;
    tracing::info!(
        server_name = %session.server_name(),
        tool_count = tools.len(),
        "Listed subordinate tools"
    );
    Ok(tools)
}

/// Render a tool listing followed by the invocation hint.
pub fn render_tool_listing(server_name: &str, tools: &[McpTool]) -> String {
    let mut out = format!("[OK] Tools from {server_name}:\n\n");

    if tools.is_empty() {
        out.push_str("No tools available from this server.\n");
    }
    for tool in tools {
        let _ = writeln!(out, "[TOOL] {}", tool.name);
        if let Some(description) = tool.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "       {description}");
        }
        out.push('\n');
    }

    let _ = write!(
        out,
        "\nTo call a tool: call_mcp_tool(mcp_name='{server_name}', tool_name='tool_name', arguments={{...}})"
    );
    out
}
