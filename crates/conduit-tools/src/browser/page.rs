use conduit_backend::{BrowserCall, SharedBackend};
use conduit_protocol::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{forward, window_scoped};
use crate::{RegistryError, ToolRegistry};

pub const DEFAULT_MONITOR_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptArgs {
    session_id: String,
    window_id: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionArgs {
    session_id: String,
    window_id: String,
    prompt: String,
    #[serde(default)]
    output_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeArgs {
    session_id: String,
    window_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitorArgs {
    session_id: String,
    window_id: String,
    condition: String,
    #[serde(default = "default_monitor_timeout")]
    timeout_seconds: u64,
}

fn default_monitor_timeout() -> u64 {
    DEFAULT_MONITOR_TIMEOUT_SECS
}

fn prompt_schema(description: &str) -> JsonSchema {
    JsonSchema::string().min_length(1).description(description)
}

pub(super) fn register(registry: &mut ToolRegistry, backend: &SharedBackend) -> Result<(), RegistryError> {
    registry.register(forward(
        "pageQuery",
        "Ask a question about the content of the page loaded in a window.",
        window_scoped()
            .property("prompt", prompt_schema("Question or instruction about the page"))
            .required(&["sessionId", "windowId", "prompt"]),
        backend,
        |args: PromptArgs| BrowserCall::PageQuery {
            session_id: args.session_id,
            window_id: args.window_id,
            prompt: args.prompt,
        },
    ))?;

    registry.register(forward(
        "paginatedExtraction",
        "Extract structured data across multiple pages, following pagination and infinite scroll.",
        window_scoped()
            .property("prompt", prompt_schema("What to extract and how to navigate between pages"))
            .property(
                "outputSchema",
                JsonSchema::any().description("JSON Schema the extracted data must conform to"),
            )
            .required(&["sessionId", "windowId", "prompt"]),
        backend,
        |args: ExtractionArgs| BrowserCall::PaginatedExtraction {
            session_id: args.session_id,
            window_id: args.window_id,
            prompt: args.prompt,
            output_schema: args.output_schema,
        },
    ))?;

    registry.register(forward(
        "scrape",
        "Scrape the text content of the page loaded in a window.",
        window_scoped().required(&["sessionId", "windowId"]),
        backend,
        |args: ScrapeArgs| BrowserCall::Scrape {
            session_id: args.session_id,
            window_id: args.window_id,
        },
    ))?;

    registry.register(forward(
        "monitorForCondition",
        "Wait until a condition described in natural language holds on the page.",
        window_scoped()
            .property(
                "condition",
                JsonSchema::string().min_length(1).description("Condition to wait for"),
            )
            .property(
                "timeoutSeconds",
                JsonSchema::integer()
                    .minimum(1)
                    .default_value(json!(DEFAULT_MONITOR_TIMEOUT_SECS))
                    .description("Seconds the backend waits before giving up"),
            )
            .required(&["sessionId", "windowId", "condition"]),
        backend,
        |args: MonitorArgs| BrowserCall::Monitor {
            session_id: args.session_id,
            window_id: args.window_id,
            condition: args.condition,
            timeout_seconds: args.timeout_seconds,
        },
    ))?;

    Ok(())
}
