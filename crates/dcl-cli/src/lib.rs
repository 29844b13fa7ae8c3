//! Command-line adapter for the DCL gateway.
//!
//! `main.rs` parses arguments, installs logging and calls [`bootstrap`];
//! handlers then drive the composed [`dcl_mcp::Gateway`].

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
