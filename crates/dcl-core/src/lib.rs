//! Core domain types for the DCL (dynamic context loading) gateway.
//!
//! This crate holds everything the gateway knows before it talks to a
//! subordinate server:
//!
//! - [`ServerDescriptor`] and the immutable [`Registry`] built at startup
//! - [`RequiredCredentials`] and missing-credential detection
//! - [`GatewayConfig`] with the two independent timeout budgets
//! - [`GatewayError`], the failure taxonomy surfaced to callers
//! - [`EnvProvider`], the injectable view of the process environment
//!
//! Nothing here spawns processes or speaks the MCP wire protocol; that lives
//! in `dcl-mcp`.

#![deny(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod domain;
pub mod env;
pub mod error;
pub mod registry;

pub use config::GatewayConfig;
pub use credentials::RequiredCredentials;
pub use domain::{McpTool, NO_CONTENT_SENTINEL, OperationResult, ServerDescriptor};
pub use env::{EnvProvider, SystemEnv};
pub use error::{ConfigError, GatewayError};
pub use registry::{Registry, build_registry, load_overrides, resolve_config_path};

#[cfg(any(test, feature = "test-utils"))]
pub use env::MockEnv;
