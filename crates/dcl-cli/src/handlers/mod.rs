//! Command handlers.
//!
//! Handlers are thin: parse CLI-specific input, call the gateway, and print
//! the gateway's text. Gateway failures are already rendered as `[ERROR]`
//! text and are printed like any other result.

pub mod call;
pub mod catalog;
pub mod serve;
pub mod tools;
