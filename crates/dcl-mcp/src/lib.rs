//! MCP plumbing for the DCL gateway.
//!
//! The client half talks to subordinate servers: [`protocol`] types, a
//! line-oriented [`transport`], an MCP [`client`], command [`resolver`],
//! process [`launcher`], the ephemeral [`session`] lifecycle and its
//! process-group [`shutdown`]. The
//! [`gateway`] front combines them with the registry, and [`server`]
//! exposes the gateway to a host agent as an MCP server on stdio.

#![deny(unsafe_code)]

pub mod client;
pub mod gateway;
pub mod invoker;
pub mod launcher;
pub mod lister;
pub mod protocol;
pub mod resolver;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod transport;

pub use client::{McpClient, McpClientError};
pub use gateway::Gateway;
pub use launcher::{CommandLauncher, LaunchError, ProcessLauncher};
pub use server::GatewayServer;
pub use session::{Session, SessionFuture, SessionManager};

// Re-export domain types from core for convenience
pub use dcl_core::{GatewayConfig, GatewayError, McpTool, OperationResult, Registry, ServerDescriptor};
