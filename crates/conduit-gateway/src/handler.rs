//! MCP request handling shared by both transports

use std::sync::Arc;

use conduit_protocol::{
    error_codes, InitializeResult, JsonRpcRequest, JsonRpcResponse, ToolResult, ToolsCallParams,
};
use conduit_tools::{RegistryError, ToolRegistry};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const SERVER_NAME: &str = "conduit";

/// Answers JSON-RPC requests against a [`ToolRegistry`].
pub struct McpHandler {
    tools: Arc<ToolRegistry>,
}

impl McpHandler {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Decode one raw frame and answer it.
    ///
    /// Returns `None` for notifications. Frames that are not valid JSON-RPC
    /// get a protocol error response.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "unparsable frame");
                return Some(JsonRpcResponse::failure(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = value.get("id").cloned();
        if !value.get("method").is_some_and(Value::is_string) {
            return Some(JsonRpcResponse::failure(
                id,
                error_codes::INVALID_REQUEST,
                "Invalid request: missing method",
            ));
        }

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                error_codes::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "resources/list" => JsonRpcResponse::success(request.id, json!({ "resources": [] })),
            "prompts/list" => JsonRpcResponse::success(request.id, json!({ "prompts": [] })),
            method if method.starts_with("notifications/") => return None,
            method => JsonRpcResponse::failure(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult::new(SERVER_NAME, env!("CARGO_PKG_VERSION"));
        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools.specs() }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ToolsCallParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                )
            }
            None => {
                return JsonRpcResponse::failure(id, error_codes::INVALID_PARAMS, "Missing params")
            }
        };

        debug!(tool = %params.name, "tools/call");
        let arguments = params.arguments.unwrap_or(Value::Null);
        let result = match self.tools.invoke(&params.name, arguments).await {
            Ok(result) => result,
            Err(err @ RegistryError::UnknownTool { .. }) => {
                warn!(tool = %params.name, "unknown tool requested");
                ToolResult::error(err.to_string())
            }
            Err(err) => ToolResult::error(format!("Internal error: {}", err)),
        };

        to_response(id, &result)
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::failure(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Internal error: {}", e),
        ),
    }
}
