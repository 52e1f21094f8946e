//! MCP (Model Context Protocol) Server Implementation
//!
//! Exposes TestRail operations as MCP tools over stdio, built directly on
//! Tokio and Serde (no external SDK).
//!
//! # Architecture
//!
//! The implementation is organized into four layers:
//!
//! 1. **Protocol Layer** (`protocol`): JSON-RPC 2.0 message types
//! 2. **Transport Layer** (`transport`): newline-delimited framing
//! 3. **Server Layer** (`server`): lifecycle and method dispatch
//! 4. **Tools Layer** (`tools`): the TestRail tool catalogue

// Protocol layer: JSON-RPC 2.0 message types
pub mod protocol;

// Transport layer: line framing over stdio
pub mod transport;

// Server layer: initialize, ping, tools/list, tools/call
pub mod server;

// Tool catalogue: schemas, argument validation, error translation
pub mod tools;

pub use protocol::{
    InitializeParams, InitializeResult, McpError, McpMethod, McpRequest, McpResponse, ServerInfo,
    Tool, ToolCallParams, ToolResult,
};
pub use server::McpServer;
pub use transport::{MessageReader, MessageWriter};

#[cfg(test)]
mod tests {
    use crate::mcp::{McpError, McpRequest};

    #[test]
    fn test_protocol_module_available() {
        let req = McpRequest::new(1, "initialize", None);
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "initialize");
    }

    #[test]
    fn test_error_creation() {
        let err = McpError::method_not_found("test_method");
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("test_method"));
    }
}
