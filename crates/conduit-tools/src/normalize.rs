//! Uniform rendering of backend-reported errors

use conduit_protocol::ToolResult;
use serde_json::Value;

pub const ERROR_BANNER: &str = "Errors from the API:";
pub const EMPTY_ERROR_TEXT: &str = "Unknown error (empty)";

/// One element of a backend `errors` collection, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    Text(String),
    Structured { message: String },
    Opaque(Value),
    Empty,
}

impl ApiError {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Self::Empty,
            Value::Number(n) if n.as_f64() == Some(0.0) => Self::Empty,
            Value::String(s) if s.is_empty() => Self::Empty,
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(map) => match map.get("message") {
                Some(Value::String(message)) => Self::Structured {
                    message: message.clone(),
                },
                _ => Self::Opaque(value.clone()),
            },
            other => Self::Opaque(other.clone()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured { message } => message.clone(),
            Self::Opaque(value) => value.to_string(),
            Self::Empty => EMPTY_ERROR_TEXT.to_string(),
        }
    }
}

impl From<&Value> for ApiError {
    fn from(value: &Value) -> Self {
        Self::classify(value)
    }
}

/// Render a backend error collection as an error-flagged result.
pub fn normalize(errors: &[Value]) -> ToolResult {
    let mut text = String::from(ERROR_BANNER);
    for error in errors {
        text.push('\n');
        text.push_str(&ApiError::classify(error).text());
    }
    ToolResult::error(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_collection_is_banner_only() {
        let result = normalize(&[]);
        assert!(result.is_error);
        assert_eq!(result.as_text(), Some(ERROR_BANNER));
    }

    #[test]
    fn test_null_element() {
        let result = normalize(&[Value::Null]);
        assert!(result.is_error);
        assert_eq!(
            result.as_text(),
            Some("Errors from the API:\nUnknown error (empty)")
        );
    }

    #[test]
    fn test_plain_string_verbatim() {
        let result = normalize(&[json!("plain string")]);
        assert_eq!(result.as_text(), Some("Errors from the API:\nplain string"));
    }

    #[test]
    fn test_structured_message() {
        let result = normalize(&[json!({"message": "x", "code": 7})]);
        assert_eq!(result.as_text(), Some("Errors from the API:\nx"));
    }

    #[test]
    fn test_empty_object_is_serialized() {
        let result = normalize(&[json!({})]);
        assert!(result.is_error);
        assert_eq!(result.as_text(), Some("Errors from the API:\n{}"));
    }

    #[test]
    fn test_mixed_elements_keep_order() {
        let result = normalize(&[
            json!("first"),
            json!({"message": 42}),
            json!(false),
            json!([1, 2]),
        ]);
        assert_eq!(
            result.as_text(),
            Some("Errors from the API:\nfirst\n{\"message\":42}\nUnknown error (empty)\n[1,2]")
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(ApiError::classify(&json!(0)), ApiError::Empty);
        assert_eq!(ApiError::classify(&json!("")), ApiError::Empty);
        assert_eq!(ApiError::classify(&json!(3)), ApiError::Opaque(json!(3)));
        assert_eq!(
            ApiError::from(&json!({"message": "m"})),
            ApiError::Structured {
                message: "m".to_string()
            }
        );
    }
}
