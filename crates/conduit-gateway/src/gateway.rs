use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use conduit_backend::SharedBackend;
use conduit_tools::{browser_tools, SessionRegistry, ToolRegistry};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connections::ConnectionRegistry;
use crate::error::GatewayError;
use crate::handler::McpHandler;
use crate::pipe;
use crate::server::{SseServer, DEFAULT_KEEP_ALIVE};

pub const DEFAULT_MAX_CONNECTIONS: usize = 64;

/// Settings for the SSE binding
#[derive(Debug, Clone)]
pub struct SseOptions {
    pub host: String,
    pub port: u16,
    pub auth_token: Option<String>,
    pub keep_alive: Duration,
}

impl Default for SseOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3456,
            auth_token: None,
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }
}

/// Top-level lifecycle object.
///
/// Owns the session and connection registries and hands them to the tool
/// catalog and the transports.
pub struct Gateway {
    handler: Arc<McpHandler>,
    sessions: Arc<SessionRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl Gateway {
    /// Build the browser catalog on top of `backend`.
    pub fn new(backend: SharedBackend, max_connections: usize) -> Result<Self, GatewayError> {
        let sessions = Arc::new(SessionRegistry::new());
        let tools = browser_tools(backend, sessions.clone())?;
        Ok(Self::with_tools(tools, sessions, max_connections))
    }

    pub fn with_tools(
        tools: ToolRegistry,
        sessions: Arc<SessionRegistry>,
        max_connections: usize,
    ) -> Self {
        Self {
            handler: Arc::new(McpHandler::new(Arc::new(tools))),
            sessions,
            connections: Arc::new(ConnectionRegistry::new(max_connections)),
        }
    }

    pub fn handler(&self) -> &Arc<McpHandler> {
        &self.handler
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    pub async fn serve_pipe<R, W>(&self, reader: R, writer: W) -> Result<(), GatewayError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        pipe::serve_pipe(&self.handler, reader, writer).await
    }

    pub async fn serve_stdio(&self) -> Result<(), GatewayError> {
        pipe::serve_stdio(&self.handler).await
    }

    pub fn sse_server(&self, options: &SseOptions) -> SseServer {
        SseServer::new(self.handler.clone(), self.connections.clone())
            .with_auth_token(options.auth_token.clone())
            .with_keep_alive(options.keep_alive)
    }

    pub async fn serve_sse<F>(&self, options: &SseOptions, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sse_server(options)
            .start(&options.host, options.port, shutdown)
            .await
    }
}
