//! Gateway error types.
//!
//! [`GatewayError`] is the failure taxonomy surfaced by the session layer to
//! the gateway front, which renders every variant as tagged text.
//! [`ConfigError`] covers override-file loading and never aborts startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::format_budget;

/// Classified failure of a gateway operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The requested server is not in the registry.
    #[error("Unknown MCP server: {name}")]
    UnknownServer {
        name: String,
        /// Every registered server name, in catalog order.
        available: Vec<String>,
    },

    /// Required environment variables are unset or empty.
    #[error("Missing required environment variables for {name}: {}", missing.join(", "))]
    MissingCredentials { name: String, missing: Vec<String> },

    /// Spawn + `initialize` did not finish within the init budget.
    #[error("Initialization of {name} exceeded {}", format_budget(*timeout))]
    InitTimeout { name: String, timeout: Duration },

    /// The list or invoke request did not finish within the operation budget.
    #[error("{operation} on {name} exceeded {}", format_budget(*timeout))]
    OperationTimeout {
        name: String,
        operation: String,
        timeout: Duration,
    },

    /// The subordinate failed to start, refused a request, or the channel broke.
    #[error("{message}")]
    Subordinate {
        name: String,
        message: String,
        /// Error source chain plus the subordinate's recent stderr output.
        trace: String,
    },
}

impl GatewayError {
    /// Build a subordinate error from any error, capturing its source chain.
    pub fn subordinate(
        name: impl Into<String>,
        error: &(dyn std::error::Error + 'static),
        stderr_tail: &[String],
    ) -> Self {
        Self::Subordinate {
            name: name.into(),
            message: error.to_string(),
            trace: diagnostic_trace(error, stderr_tail),
        }
    }

    /// Short machine-friendly name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownServer { .. } => "UnknownServer",
            Self::MissingCredentials { .. } => "MissingCredentials",
            Self::InitTimeout { .. } => "InitTimeout",
            Self::OperationTimeout { .. } => "OperationTimeout",
            Self::Subordinate { .. } => "SubordinateError",
        }
    }
}

/// Format an error's source chain followed by captured stderr lines.
pub fn diagnostic_trace(error: &(dyn std::error::Error + 'static), stderr_tail: &[String]) -> String {
    let mut lines = vec![format!("0: {error}")];

    let mut source = error.source();
    let mut depth = 1;
    while let Some(cause) = source {
        lines.push(format!("{depth}: caused by: {cause}"));
        source = cause.source();
        depth += 1;
    }

    if stderr_tail.is_empty() {
        lines.push("(no stderr output captured from the server)".to_string());
    } else {
        lines.push(format!("server stderr (last {} lines):", stderr_tail.len()));
        lines.extend(stderr_tail.iter().map(|line| format!("  | {line}")));
    }

    lines.join("\n")
}

/// Errors loading the server override file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid server entry '{name}' in {}: {source}", path.display())]
    InvalidEntry {
        path: PathBuf,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
