//! Tool-related types for the protocol

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// JSON Schema for a tool's input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// `None` accepts any JSON type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "additionalProperties"
    )]
    pub additional_properties: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl JsonSchema {
    fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self {
            properties: Some(json!({})),
            additional_properties: Some(false),
            ..Self::typed("object")
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn string() -> Self {
        Self::typed("string")
    }

    pub fn number() -> Self {
        Self::typed("number")
    }

    pub fn integer() -> Self {
        Self::typed("integer")
    }

    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    pub fn array(items: JsonSchema) -> Self {
        Self::typed("array").with_extra("items", schema_value(&items))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn property(mut self, name: &str, schema: JsonSchema) -> Self {
        let props = self.properties.get_or_insert_with(|| json!({}));
        if let Some(obj) = props.as_object_mut() {
            obj.insert(name.to_string(), schema_value(&schema));
        }
        self
    }

    pub fn required(mut self, fields: &[&str]) -> Self {
        self.required = Some(fields.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn minimum(self, minimum: i64) -> Self {
        self.with_extra("minimum", json!(minimum))
    }

    pub fn min_length(self, min_length: u64) -> Self {
        self.with_extra("minLength", json!(min_length))
    }

    pub fn default_value(self, value: Value) -> Self {
        self.with_extra("default", value)
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Sub-schema declared for `name`, if any.
    pub fn property_schema(&self, name: &str) -> Option<JsonSchema> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(name))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn items(&self) -> Option<JsonSchema> {
        self.extra
            .get("items")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

fn schema_value(schema: &JsonSchema) -> Value {
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

/// Tool descriptor returned by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: JsonSchema,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: JsonSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: schema,
        }
    }
}

/// A single block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// The envelope every tool invocation resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    pub fn json(value: &Value) -> Self {
        Self::text(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            is_error: true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
    }

    /// All text blocks joined with newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_builder() {
        let schema = JsonSchema::object()
            .description("A test schema")
            .property("name", JsonSchema::string())
            .required(&["name"]);

        assert_eq!(schema.schema_type.as_deref(), Some("object"));
        assert!(schema.description.is_some());
        assert_eq!(
            schema.property_schema("name").unwrap().schema_type.as_deref(),
            Some("string")
        );
    }

    #[test]
    fn test_schema_serializes_like_json_schema() {
        let schema = JsonSchema::object()
            .property("timeoutSeconds", JsonSchema::integer().minimum(1).default_value(json!(30)))
            .required(&[]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["additionalProperties"], false);
        assert_eq!(json["properties"]["timeoutSeconds"]["minimum"], 1);
        assert_eq!(json["properties"]["timeoutSeconds"]["default"], 30);
    }

    #[test]
    fn test_any_schema_omits_type() {
        let json = serde_json::to_value(JsonSchema::any().description("anything")).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_array_items_round_trip() {
        let schema = JsonSchema::array(JsonSchema::string());
        assert_eq!(schema.items().unwrap().schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_tool_spec_uses_camel_case() {
        let spec = ToolSpec::new("scrape", "Scrape a window", JsonSchema::object());
        let json = serde_json::to_value(&spec).unwrap();
        assert!(json.get("inputSchema").is_some());
    }

    #[test]
    fn test_tool_result_wire_shape() {
        let ok = serde_json::to_value(ToolResult::text("Done!")).unwrap();
        assert_eq!(ok["content"][0]["type"], "text");
        assert_eq!(ok["content"][0]["text"], "Done!");
        assert_eq!(ok["isError"], false);

        let err = ToolResult::error("boom");
        assert!(err.is_error);
        assert_eq!(err.as_text(), Some("boom"));
    }

    #[test]
    fn test_is_error_defaults_false() {
        let result: ToolResult =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"hi"}]}"#).unwrap();
        assert!(!result.is_error);
    }
}
