use conduit_backend::{BrowserCall, Coordinate, SharedBackend};
use conduit_protocol::JsonSchema;
use serde::Deserialize;

use super::{forward, window_scoped};
use crate::{RegistryError, ToolRegistry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClickArgs {
    session_id: String,
    window_id: String,
    element_description: String,
    #[serde(default)]
    coordinate: Option<Coordinate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrollArgs {
    session_id: String,
    window_id: String,
    #[serde(default)]
    element_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeArgs {
    session_id: String,
    window_id: String,
    text: String,
    #[serde(default)]
    element_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileInputArgs {
    session_id: String,
    window_id: String,
    element_description: String,
    file_path: String,
}

fn element_schema(description: &str) -> JsonSchema {
    JsonSchema::string().min_length(1).description(description)
}

fn coordinate_schema() -> JsonSchema {
    JsonSchema::object()
        .description("Viewport position to click instead of resolving the element")
        .property("x", JsonSchema::number())
        .property("y", JsonSchema::number())
        .required(&["x", "y"])
}

pub(super) fn register(registry: &mut ToolRegistry, backend: &SharedBackend) -> Result<(), RegistryError> {
    registry.register(forward(
        "click",
        "Click an element on the page, described in natural language.",
        window_scoped()
            .property("elementDescription", element_schema("The element to click"))
            .property("coordinate", coordinate_schema())
            .required(&["sessionId", "windowId", "elementDescription"]),
        backend,
        |args: ClickArgs| BrowserCall::Click {
            session_id: args.session_id,
            window_id: args.window_id,
            element_description: args.element_description,
            coordinate: args.coordinate,
        },
    ))?;

    registry.register(forward(
        "scroll",
        "Scroll the page, optionally until a described element is in view.",
        window_scoped()
            .property("elementDescription", element_schema("The element to scroll to"))
            .required(&["sessionId", "windowId"]),
        backend,
        |args: ScrollArgs| BrowserCall::Scroll {
            session_id: args.session_id,
            window_id: args.window_id,
            element_description: args.element_description,
        },
    ))?;

    registry.register(forward(
        "type",
        "Type text into the page, optionally into a described element.",
        window_scoped()
            .property("text", JsonSchema::string().description("Text to type"))
            .property("elementDescription", element_schema("The element to type into"))
            .required(&["sessionId", "windowId", "text"]),
        backend,
        |args: TypeArgs| BrowserCall::Type {
            session_id: args.session_id,
            window_id: args.window_id,
            text: args.text,
            element_description: args.element_description,
        },
    ))?;

    registry.register(forward(
        "fileInput",
        "Upload a file through a file input element on the page.",
        window_scoped()
            .property("elementDescription", element_schema("The file input element"))
            .property(
                "filePath",
                JsonSchema::string().min_length(1).description("Path of the file to upload"),
            )
            .required(&["sessionId", "windowId", "elementDescription", "filePath"]),
        backend,
        |args: FileInputArgs| BrowserCall::FileInput {
            session_id: args.session_id,
            window_id: args.window_id,
            element_description: args.element_description,
            file_path: args.file_path,
        },
    ))?;

    Ok(())
}
