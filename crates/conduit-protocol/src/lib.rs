//! Wire types shared by every Conduit crate.
//!
//! - `jsonrpc`: JSON-RPC 2.0 framing plus the MCP handshake payloads
//! - `tools`: tool descriptors, input schemas and the `ToolResult` envelope

pub mod jsonrpc;
pub mod tools;

pub use jsonrpc::{
    error_codes, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, PROTOCOL_VERSION,
};
pub use tools::{ContentBlock, JsonSchema, ToolResult, ToolSpec};
