//! Tool error types

use conduit_backend::BackendError;
use serde_json::Value;
use thiserror::Error;

use crate::normalize::ApiError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The backend answered, but with an `errors` collection.
    #[error("backend reported errors: {}", summarize(.0))]
    Reported(Vec<Value>),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Message(String),
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

fn summarize(errors: &[Value]) -> String {
    errors
        .iter()
        .map(|e| ApiError::classify(e).text())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{name}' is already registered")]
    DuplicateTool { name: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
}
