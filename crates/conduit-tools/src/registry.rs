//! Tool registry: validation and dispatch

use conduit_protocol::{ToolResult, ToolSpec};
use futures::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::validate::{describe, validate};
use crate::{BoxedTool, RegistryError, Tool, ToolError};

/// Registry of the tools exposed to the agent.
///
/// `invoke` resolves every registered call to a [`ToolResult`]; handler
/// errors and panics become error-flagged results.
pub struct ToolRegistry {
    tools: HashMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        self.register_boxed(Arc::new(tool))
    }

    pub fn register_boxed(&mut self, tool: BoxedTool) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool descriptors for `tools/list`, sorted by name
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec::new(t.name(), t.description(), t.schema()))
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Validate `input` and run the named tool.
    ///
    /// Only an unknown name is reported as `Err`.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<ToolResult, RegistryError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTool {
                name: name.to_string(),
            })?;

        let input = if input.is_null() { json!({}) } else { input };

        if let Err(violations) = validate(&tool.schema(), &input) {
            debug!(tool = name, violations = violations.len(), "rejected tool input");
            return Ok(ToolResult::error(describe(name, &violations)));
        }

        debug!(tool = name, "invoking tool");
        let outcome = AssertUnwindSafe(tool.execute(input)).catch_unwind().await;

        let result = match outcome {
            Ok(Ok(result)) if result.content.is_empty() => ToolResult {
                content: ToolResult::text("(no content)").content,
                is_error: result.is_error,
            },
            Ok(Ok(result)) => result,
            Ok(Err(ToolError::Reported(errors))) => {
                warn!(tool = name, errors = errors.len(), "backend reported errors");
                normalize(&errors)
            }
            Ok(Err(ToolError::InvalidInput { message })) => {
                ToolResult::error(format!("Invalid input for tool '{}': {}", name, message))
            }
            Ok(Err(err)) => {
                warn!(tool = name, error = %err, "tool failed");
                ToolResult::error(format!("Internal error: {}", err))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = name, panic = %message, "tool panicked");
                ToolResult::error(format!("Internal error: {}", message))
            }
        };

        Ok(result)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
