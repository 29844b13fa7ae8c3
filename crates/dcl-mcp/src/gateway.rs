//! The gateway front: catalog, lazy tool loading and invocation.
//!
//! Every public operation renders its outcome as text for the host agent.
//! Failures become `[ERROR]`-tagged messages and never take the gateway down.
//! The `try_*` variants return the typed result for callers that want it.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use dcl_core::config::format_budget;
use dcl_core::{
    EnvProvider, GatewayConfig, GatewayError, McpTool, OperationResult, Registry,
    ServerDescriptor,
};
use serde_json::{Map, Value};

use crate::invoker::invoke;
use crate::launcher::ProcessLauncher;
use crate::lister::{list_operations, render_tool_listing};
use crate::session::SessionManager;

/// Which gateway operation a failure belongs to; selects the error wording.
#[derive(Debug, Clone, Copy)]
enum Action<'a> {
    Load,
    Call { tool: &'a str },
}

/// Lazy-loading front over the server registry.
pub struct Gateway {
    registry: Arc<Registry>,
    env: Arc<dyn EnvProvider>,
    sessions: SessionManager,
}

impl Gateway {
    pub fn new(
        registry: Arc<Registry>,
        env: Arc<dyn EnvProvider>,
        launcher: Arc<dyn ProcessLauncher>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            registry,
            env,
            sessions: SessionManager::new(launcher, config),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub const fn config(&self) -> &GatewayConfig {
        self.sessions.config()
    }

    /// Version string reported by `get_version`.
    pub fn version() -> String {
        format!("DCL Wrapper v{}", env!("CARGO_PKG_VERSION"))
    }

    /// Every registered server with its description and missing credentials.
    pub fn list_catalog(&self) -> String {
        let mut out = String::from("Available MCP Servers:\n\n");

        for server in self.registry.iter() {
            let _ = writeln!(out, "[MCP] {}", server.name);
            let _ = writeln!(out, "      {}", server.description);

            let missing = self
                .registry
                .missing_credentials(&server.name, self.env.as_ref());
            if !missing.is_empty() {
                let _ = writeln!(out, "      ⚠️  Missing env vars: {}", missing.join(", "));
            }
            out.push('\n');
        }

        out.push_str("\nTo use tools from any server, call: load_mcp_tools(mcp_name='server_name')");
        out
    }

    /// Connect to `name`, list its tools and render them.
    pub async fn load_server(&self, name: &str) -> String {
        match self.try_load_server(name).await {
            Ok(tools) => render_tool_listing(name, &tools),
            Err(e) => render_failure(Action::Load, name, &e),
        }
    }

    /// Connect to `name`, invoke `operation` and render the result.
    pub async fn invoke_operation(
        &self,
        name: &str,
        operation: &str,
        arguments: Option<Map<String, Value>>,
    ) -> String {
        match self.try_invoke_operation(name, operation, arguments).await {
            Ok(result) => result.render(),
            Err(e) => render_failure(Action::Call { tool: operation }, name, &e),
        }
    }

    pub async fn try_load_server(&self, name: &str) -> Result<Vec<McpTool>, GatewayError> {
        let descriptor = self.gate(name)?;
        tracing::info!(server_name = %name, "Loading tools");

        self.sessions
            .with_session(descriptor, |session| Box::pin(list_operations(session)))
            .await
    }

    pub async fn try_invoke_operation(
        &self,
        name: &str,
        operation: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<OperationResult, GatewayError> {
        let descriptor = self.gate(name)?;
        tracing::info!(server_name = %name, tool = operation, "Calling tool");

        let operation = operation.to_string();
        let arguments = arguments.unwrap_or_default();
        self.sessions
            .with_session(descriptor, move |session| {
                Box::pin(async move { invoke(session, &operation, arguments).await })
            })
            .await
    }

    /// Registry and credential checks that run before anything is spawned.
    fn gate(&self, name: &str) -> Result<&ServerDescriptor, GatewayError> {
        let Some(descriptor) = self.registry.get(name) else {
            return Err(GatewayError::UnknownServer {
                name: name.to_string(),
                available: self.registry.names(),
            });
        };

        let missing = self.registry.missing_credentials(name, self.env.as_ref());
        if !missing.is_empty() {
            return Err(GatewayError::MissingCredentials {
                name: name.to_string(),
                missing,
            });
        }

        Ok(descriptor)
    }
}

fn render_failure(action: Action<'_>, name: &str, error: &GatewayError) -> String {
    tracing::warn!(server_name = %name, kind = error.kind(), error = %error, "Gateway operation failed");

    match error {
        GatewayError::UnknownServer { available, .. } => format!(
            "[ERROR] Unknown MCP server: {name}\n\nAvailable servers: {}",
            available.join(", ")
        ),
        GatewayError::MissingCredentials { missing, .. } => {
            let verb = match action {
                Action::Load => "load",
                Action::Call { .. } => "use",
            };
            format!(
                "[ERROR] Cannot {verb} {name}: Missing required environment variables: {}\n\n\
                 Please set these environment variables and restart the DCL wrapper.",
                missing.join(", ")
            )
        }
        GatewayError::InitTimeout { timeout, .. } => {
            timeout_message(action, name, *timeout, "initialization")
        }
        GatewayError::OperationTimeout { timeout, .. } => {
            timeout_message(action, name, *timeout, "operation")
        }
        GatewayError::Subordinate { message, trace, .. } => {
            let context = match action {
                Action::Load => format!("connecting to {name}"),
                Action::Call { tool } => format!("calling {tool} on {name}"),
            };
            format!("[ERROR] Error {context}: {message}\n\nDiagnostic trace:\n{trace}")
        }
    }
}

fn timeout_message(action: Action<'_>, name: &str, timeout: Duration, budget: &str) -> String {
    let limit = format_budget(timeout);
    match action {
        Action::Load => {
            format!("[ERROR] Timeout connecting to {name} (exceeded {limit} {budget} timeout)")
        }
        Action::Call { tool } => {
            format!("[ERROR] Tool {tool} on {name} timed out (exceeded {limit} {budget} timeout)")
        }
    }
}
