//! Catalog command handler.

use crate::bootstrap::CliContext;

/// Print the server catalog.
pub fn execute(ctx: &CliContext) {
    println!("{}", ctx.gateway.list_catalog());
}
