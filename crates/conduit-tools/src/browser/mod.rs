//! Browser tool catalog
//!
//! Every tool is a thin delegation to the [`BrowserBackend`](conduit_backend::BrowserBackend):
//! arguments are decoded, forwarded as one [`BrowserCall`], and the backend's
//! answer is rendered into a [`ToolResult`].

mod interaction;
mod page;
mod session;
mod window;

use conduit_backend::{BackendResponse, BrowserCall, SharedBackend};
use conduit_protocol::{ContentBlock, JsonSchema, ToolResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::normalize::ApiError;
use crate::{FunctionTool, RegistryError, SessionRegistry, Tool, ToolError, ToolRegistry};

/// Build the registry holding every browser tool.
pub fn browser_tools(
    backend: SharedBackend,
    sessions: Arc<SessionRegistry>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    session::register(&mut registry, &backend, &sessions)?;
    window::register(&mut registry, &backend)?;
    page::register(&mut registry, &backend)?;
    interaction::register(&mut registry, &backend)?;
    Ok(registry)
}

fn parse_args<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::invalid_input(e.to_string()))
}

/// Turn a backend-reported error collection into `ToolError::Reported`.
fn confirmed(response: BackendResponse) -> Result<BackendResponse, ToolError> {
    if response.has_errors() {
        Err(ToolError::Reported(response.errors))
    } else {
        Ok(response)
    }
}

/// Render a successful backend answer.
///
/// A model answer (`data.modelResponse`) is returned as-is; any other payload
/// is pretty-printed. Warnings get their own block.
fn render(response: &BackendResponse) -> ToolResult {
    let mut result = match &response.data {
        Value::Null => ToolResult::text("OK"),
        Value::String(text) => ToolResult::text(text.clone()),
        data => match data.get("modelResponse").and_then(Value::as_str) {
            Some(answer) => ToolResult::text(answer),
            None => ToolResult::json(data),
        },
    };

    if !response.warnings.is_empty() {
        let warnings: Vec<String> = response
            .warnings
            .iter()
            .map(|w| ApiError::classify(w).text())
            .collect();
        result.content.push(ContentBlock::text(format!(
            "Warnings from the API:\n{}",
            warnings.join("\n")
        )));
    }
    result
}

/// A tool that decodes `A`, forwards the call built from it and renders the answer.
fn forward<A, F>(
    name: &str,
    description: &str,
    schema: JsonSchema,
    backend: &SharedBackend,
    build: F,
) -> impl Tool
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> BrowserCall + Send + Sync + 'static,
{
    let backend = backend.clone();
    FunctionTool::new(name, description, schema, move |input: Value| {
        let call = parse_args::<A>(input).map(&build);
        send(backend.clone(), call)
    })
}

async fn send(
    backend: SharedBackend,
    call: Result<BrowserCall, ToolError>,
) -> Result<ToolResult, ToolError> {
    let response = confirmed(backend.call(call?).await?)?;
    Ok(render(&response))
}

fn session_id_schema() -> JsonSchema {
    JsonSchema::string()
        .min_length(1)
        .description("ID of the browser session")
}

fn window_id_schema() -> JsonSchema {
    JsonSchema::string()
        .min_length(1)
        .description("ID of the browser window within the session")
}

/// Object schema with `sessionId` and `windowId` properties.
fn window_scoped() -> JsonSchema {
    JsonSchema::object()
        .property("sessionId", session_id_schema())
        .property("windowId", window_id_schema())
}
