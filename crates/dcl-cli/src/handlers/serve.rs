//! Serve command handler: the gateway as an MCP server on stdio.

use std::sync::Arc;

use anyhow::Result;
use dcl_mcp::GatewayServer;
use tokio::io::BufReader;

use crate::bootstrap::CliContext;

/// Serve the host agent until it closes stdin.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    tracing::info!("Serving MCP on stdio");

    let server = GatewayServer::new(Arc::clone(&ctx.gateway));
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!("Host disconnected, shutting down");
    Ok(())
}
