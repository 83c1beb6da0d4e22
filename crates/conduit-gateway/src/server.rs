use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::connections::ConnectionRegistry;
use crate::error::GatewayError;
use crate::handler::McpHandler;

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(15);

struct AppState {
    handler: Arc<McpHandler>,
    connections: Arc<ConnectionRegistry>,
    auth_token: Option<String>,
    keep_alive: Duration,
    start_time: Instant,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_connections: usize,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Multi-client transport: one event stream per client plus a message endpoint.
///
/// `GET /sse` opens a stream whose first `endpoint` event names the URL the
/// client posts requests to. Responses come back as `message` events on the
/// same stream.
pub struct SseServer {
    handler: Arc<McpHandler>,
    connections: Arc<ConnectionRegistry>,
    auth_token: Option<String>,
    keep_alive: Duration,
}

impl SseServer {
    pub fn new(handler: Arc<McpHandler>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            handler,
            connections,
            auth_token: None,
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }

    /// Set an authentication token. When set, `/sse` and `/messages` require
    /// a matching `Authorization: Bearer <token>` header.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            handler: self.handler.clone(),
            connections: self.connections.clone(),
            auth_token: self.auth_token.clone(),
            keep_alive: self.keep_alive,
            start_time: Instant::now(),
        });
        Router::new()
            .route("/sse", get(sse_handler))
            .route("/messages", post(message_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(&self, host: &str, port: u16, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| GatewayError::ServerError(format!("failed to bind {}: {}", addr, e)))?;

        info!("SSE gateway listening on http://{}/sse", addr);
        self.serve(listener, shutdown).await
    }

    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let connections = self.connections.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutting down, closing {} connection(s)", connections.len());
                connections.close_all();
            })
            .await
            .map_err(|e| GatewayError::ServerError(e.to_string()))
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected_token) = &state.auth_token else {
        return Ok(());
    };
    let auth_header = headers.get("authorization").and_then(|v| v.to_str().ok());
    match auth_header.and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) if token == expected_token.as_str() => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED.into_response()),
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_connections: state.connections.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn sse_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let (guard, mut rx) = match state.connections.open() {
        Ok(opened) => opened,
        Err(e) => {
            warn!(error = %e, "rejecting SSE connection");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };

    let endpoint = format!("/messages?sessionId={}", guard.id());
    info!(connection_id = %guard.id(), "SSE client connected");

    // The guard lives inside the stream, so the entry goes away whenever the
    // response body is dropped.
    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<Event, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().event("message").data(message));
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response()
}

async fn message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let Some(connection_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId parameter").into_response();
    };

    let Some(sender) = state.connections.sender(&connection_id) else {
        warn!(connection_id = %connection_id, "message for unknown connection");
        return (
            StatusCode::BAD_REQUEST,
            format!("No active connection for sessionId {}", connection_id),
        )
            .into_response();
    };

    if let Err(e) = serde_json::from_str::<Value>(&body) {
        return (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)).into_response();
    }

    let handler = state.handler.clone();
    tokio::spawn(async move {
        debug!(connection_id = %connection_id, "dispatching message");
        let Some(response) = handler.handle_message(&body).await else {
            return;
        };
        match serde_json::to_string(&response) {
            Ok(frame) => {
                if sender.send(frame).await.is_err() {
                    debug!(connection_id = %connection_id, "connection closed before response");
                }
            }
            Err(e) => warn!(connection_id = %connection_id, error = %e, "failed to encode response"),
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
