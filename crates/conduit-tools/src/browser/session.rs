use conduit_backend::{BrowserCall, SessionConfiguration, SharedBackend};
use conduit_protocol::{ContentBlock, JsonSchema, ToolResult};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::{confirmed, parse_args, session_id_schema};
use crate::{FunctionTool, RegistryError, SessionRegistry, ToolError, ToolRegistry};

#[derive(Debug, Default, Deserialize)]
struct CreateSessionArgs {
    #[serde(default)]
    configuration: Option<SessionConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TerminateSessionArgs {
    session_id: String,
}

fn configuration_schema() -> JsonSchema {
    JsonSchema::object()
        .description("Session options")
        .property(
            "profileName",
            JsonSchema::string()
                .min_length(1)
                .description("Browser profile to load; it is saved back when the session is terminated"),
        )
        .property(
            "proxy",
            JsonSchema::any().description("true for the default proxy, or a proxy configuration object"),
        )
        .property(
            "solveCaptcha",
            JsonSchema::boolean().description("Solve CAPTCHAs automatically"),
        )
        .property(
            "timeoutMinutes",
            JsonSchema::integer()
                .minimum(1)
                .description("Idle minutes before the backend ends the session"),
        )
        .property(
            "extensionIds",
            JsonSchema::array(JsonSchema::string()).description("Browser extensions to install"),
        )
}

pub(super) fn register(
    registry: &mut ToolRegistry,
    backend: &SharedBackend,
    sessions: &Arc<SessionRegistry>,
) -> Result<(), RegistryError> {
    let (create_backend, create_sessions) = (backend.clone(), sessions.clone());
    registry.register(FunctionTool::new(
        "createSession",
        "Start a new browser session. Returns the session ID used by every other tool.",
        JsonSchema::object().property("configuration", configuration_schema()),
        move |input: Value| create_session(create_backend.clone(), create_sessions.clone(), input),
    ))?;

    let (terminate_backend, terminate_sessions) = (backend.clone(), sessions.clone());
    registry.register(FunctionTool::new(
        "terminateSession",
        "End a browser session. A profile named at creation is saved first.",
        JsonSchema::object()
            .property("sessionId", session_id_schema())
            .required(&["sessionId"]),
        move |input: Value| {
            terminate_session(terminate_backend.clone(), terminate_sessions.clone(), input)
        },
    ))?;

    Ok(())
}

async fn create_session(
    backend: SharedBackend,
    sessions: Arc<SessionRegistry>,
    input: Value,
) -> Result<ToolResult, ToolError> {
    let args: CreateSessionArgs = parse_args(input)?;
    let configuration = args.configuration.unwrap_or_default();
    let profile_name = configuration.profile_name.clone();

    let response = confirmed(backend.call(BrowserCall::CreateSession { configuration }).await?)?;
    let session_id = response
        .data_str("id")
        .ok_or_else(|| ToolError::Message("backend response did not include a session id".into()))?;

    // Only confirmed sessions are tracked, so a failed creation leaves nothing behind.
    if let Some(profile) = profile_name {
        sessions.track(session_id, Some(profile)).await;
    }
    info!(session_id, "browser session created");

    Ok(ToolResult::text(format!("Session created with ID: {}", session_id)))
}

async fn terminate_session(
    backend: SharedBackend,
    sessions: Arc<SessionRegistry>,
    input: Value,
) -> Result<ToolResult, ToolError> {
    let args: TerminateSessionArgs = parse_args(input)?;
    let session_id = args.session_id;

    let profile = sessions
        .lookup(&session_id)
        .await
        .and_then(|m| m.profile_name);
    let outcome = terminate(&backend, &session_id, profile).await;
    sessions.release(&session_id).await;

    let mut result = ToolResult::text(format!("Session {} terminated", session_id));
    if let Some(note) = outcome? {
        result.content.push(ContentBlock::text(note));
    }
    Ok(result)
}

/// Save the profile when one is tracked, then end the session.
///
/// A failed profile save does not stop the termination; it is returned as a
/// note for the caller.
async fn terminate(
    backend: &SharedBackend,
    session_id: &str,
    profile: Option<String>,
) -> Result<Option<String>, ToolError> {
    let mut note = None;

    if let Some(profile_name) = profile {
        let save = backend
            .call(BrowserCall::SaveProfileOnTermination {
                session_id: session_id.to_string(),
                profile_name: profile_name.clone(),
            })
            .await
            .map_err(ToolError::from)
            .and_then(confirmed);
        if let Err(err) = save {
            warn!(session_id, profile = %profile_name, error = %err, "profile save failed");
            note = Some(format!("Profile '{}' was not saved: {}", profile_name, err));
        }
    }

    confirmed(
        backend
            .call(BrowserCall::TerminateSession {
                session_id: session_id.to_string(),
            })
            .await?,
    )?;
    info!(session_id, "browser session terminated");
    Ok(note)
}
