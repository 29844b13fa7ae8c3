//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Lazy-loading MCP gateway.
///
/// Exposes a catalog of MCP servers to a host agent and only starts a
/// server when its tools are requested.
#[derive(Debug, Parser)]
#[command(name = "dcl")]
#[command(about = "Dynamic context loading gateway for MCP servers")]
#[command(version)]
pub struct Cli {
    /// Server override file (default: ./mcp_config.json, then the user config dir)
    #[arg(long, global = true, env = "DCL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds allowed for spawning a server and completing its handshake
    #[arg(
        long = "init-timeout",
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub init_timeout: Option<u64>,

    /// Seconds allowed for a tool listing or tool call
    #[arg(
        long = "operation-timeout",
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub operation_timeout: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
