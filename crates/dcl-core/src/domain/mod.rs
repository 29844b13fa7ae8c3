//! Gateway domain types.
//!
//! These types describe subordinate servers and what they return,
//! independent of process management or the wire protocol.
//!
//! # Design
//!
//! - `ServerDescriptor` - How to launch one subordinate server
//! - `McpTool` - An operation declared by a subordinate server
//! - `OperationResult` - Normalized outcome of invoking an operation

mod server;
mod tool;

pub use server::ServerDescriptor;
pub use tool::{McpTool, NO_CONTENT_SENTINEL, OperationResult};
