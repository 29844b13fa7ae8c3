//! Operation invocation on a live session.

use dcl_core::{GatewayError, OperationResult};
use serde_json::{Map, Value};

use crate::session::Session;

/// Invoke `operation` with `arguments` passed through untouched.
pub async fn invoke(
    session: &Session,
    operation: &str,
    arguments: Map<String, Value>,
) -> Result<OperationResult, GatewayError> {
    let result = session.call_tool(operation, arguments).await?;

    if result.is_error {
        tracing::warn!(
            server_name = %session.server_name(),
            tool = operation,
            "Subordinate reported a tool error"
        );
    }
    if result.is_empty() {
        tracing::debug!(
            server_name = %session.server_name(),
            tool = operation,
            "Tool returned no content"
        );
    }

    Ok(result)
}
