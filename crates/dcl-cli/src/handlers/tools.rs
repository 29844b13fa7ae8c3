//! Tools command handler.

use crate::bootstrap::CliContext;

/// Start `server`, print its tools, and stop it again.
pub async fn execute(ctx: &CliContext, server: &str) {
    println!("{}", ctx.gateway.load_server(server).await);
}
