//! Subcommands of the `dcl` binary.

use clap::Subcommand;

#[derive(Debug, Default, Subcommand)]
pub enum Commands {
    /// Run the gateway as an MCP server on stdin/stdout (default)
    #[default]
    Serve,

    /// Print the server catalog
    Catalog,

    /// Start a server and list its tools
    Tools {
        /// Server name from the catalog
        server: String,
    },

    /// Start a server and call one of its tools
    Call {
        /// Server name from the catalog
        server: String,
        /// Tool to call
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, value_name = "JSON")]
        args: Option<String>,
    },

    /// Print the gateway version
    Version,
}
