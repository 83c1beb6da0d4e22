//! Transport gateway hosting the Conduit tool catalog over MCP
//!
//! Two bindings share one [`McpHandler`]: a strictly synchronous pipe
//! ([`serve_pipe`]) and a multi-client SSE server ([`SseServer`]).

mod connections;
mod error;
mod gateway;
mod handler;
mod pipe;
mod server;

pub use connections::{ConnectionGuard, ConnectionRegistry};
pub use error::GatewayError;
pub use gateway::{Gateway, SseOptions, DEFAULT_MAX_CONNECTIONS};
pub use handler::{McpHandler, SERVER_NAME};
pub use pipe::{serve_pipe, serve_stdio};
pub use server::{SseServer, DEFAULT_KEEP_ALIVE};
