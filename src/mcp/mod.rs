//! MCP-style JSON-RPC tool interface

pub mod dispatch;
pub mod protocol;
pub mod stdio;

pub use dispatch::McpHandler;
