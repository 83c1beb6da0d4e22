//! Tool trait and handler definitions

use async_trait::async_trait;
use conduit_protocol::{JsonSchema, ToolResult};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::ToolError;

/// An operation exposed to the agent
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Schema the registry validates input against before `execute`
    fn schema(&self) -> JsonSchema;

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

pub type BoxedTool = Arc<dyn Tool>;

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + 'static>>;

/// Function-based tool handler
pub trait ToolHandler: Send + Sync {
    fn call(&self, input: Value) -> ToolFuture;
}

impl<F, Fut> ToolHandler for F
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
{
    fn call(&self, input: Value) -> ToolFuture {
        Box::pin((self)(input))
    }
}

/// Wrapper to create a Tool from a handler function
pub struct FunctionTool<H: ToolHandler> {
    name: String,
    description: String,
    schema: JsonSchema,
    handler: H,
}

impl<H: ToolHandler> FunctionTool<H> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: JsonSchema,
        handler: H,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler,
        }
    }
}

#[async_trait]
impl<H: ToolHandler + 'static> Tool for FunctionTool<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> JsonSchema {
        self.schema.clone()
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        self.handler.call(input).await
    }
}
