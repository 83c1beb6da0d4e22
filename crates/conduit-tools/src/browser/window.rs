use conduit_backend::{BrowserCall, SharedBackend};
use conduit_protocol::{JsonSchema, ToolResult};
use serde::Deserialize;
use serde_json::Value;

use super::{confirmed, forward, parse_args, session_id_schema, window_scoped};
use crate::{FunctionTool, RegistryError, ToolError, ToolRegistry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateWindowArgs {
    session_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowArgs {
    session_id: String,
    window_id: String,
}

pub(super) fn register(registry: &mut ToolRegistry, backend: &SharedBackend) -> Result<(), RegistryError> {
    let create_backend = backend.clone();
    registry.register(FunctionTool::new(
        "createWindow",
        "Open a new window in a browser session and navigate it to a URL.",
        JsonSchema::object()
            .property("sessionId", session_id_schema())
            .property(
                "url",
                JsonSchema::string().min_length(1).description("URL to load in the new window"),
            )
            .required(&["sessionId", "url"]),
        move |input: Value| create_window(create_backend.clone(), input),
    ))?;

    registry.register(forward(
        "getWindowInfo",
        "Get details about a browser window, including its live view URL.",
        window_scoped().required(&["sessionId", "windowId"]),
        backend,
        |args: WindowArgs| BrowserCall::GetWindowInfo {
            session_id: args.session_id,
            window_id: args.window_id,
        },
    ))?;

    Ok(())
}

async fn create_window(backend: SharedBackend, input: Value) -> Result<ToolResult, ToolError> {
    let args: CreateWindowArgs = parse_args(input)?;
    let response = confirmed(
        backend
            .call(BrowserCall::CreateWindow {
                session_id: args.session_id,
                url: args.url,
            })
            .await?,
    )?;
    let window_id = response
        .data_str("windowId")
        .ok_or_else(|| ToolError::Message("backend response did not include a window id".into()))?;
    Ok(ToolResult::text(format!("Window created with ID: {}", window_id)))
}
