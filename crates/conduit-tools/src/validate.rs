//! Structural validation of tool input against its declared schema
//!
//! Covers the subset of JSON Schema the catalog declares: `type`,
//! `properties`, `required`, `additionalProperties`, `items`, `enum`,
//! `minimum` and `minLength`.

use conduit_protocol::JsonSchema;
use serde_json::Value;
use std::fmt;

const ROOT: &str = "input";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

pub fn validate(schema: &JsonSchema, input: &Value) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check(schema, input, ROOT, &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Human-readable report listing every violation on its own line.
pub fn describe(tool: &str, violations: &[Violation]) -> String {
    let mut message = format!("Invalid input for tool '{}':", tool);
    for violation in violations {
        message.push_str("\n- ");
        message.push_str(&violation.to_string());
    }
    message
}

fn check(schema: &JsonSchema, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let mut push = |reason: String| {
        out.push(Violation {
            path: path.to_string(),
            reason,
        })
    };

    if let Some(expected) = schema.schema_type.as_deref() {
        if !matches_type(expected, value) {
            push(format!("expected {}, got {}", expected, type_name(value)));
            return;
        }
    }

    if let Some(Value::Array(allowed)) = schema.extra.get("enum") {
        if !allowed.contains(value) {
            push(format!("must be one of {}", Value::Array(allowed.clone())));
        }
    }

    if let (Some(min), Some(n)) = (schema.extra.get("minimum").and_then(Value::as_f64), value.as_f64()) {
        if n < min {
            push(format!("must be at least {}", min));
        }
    }

    if let (Some(min), Some(s)) = (schema.extra.get("minLength").and_then(Value::as_u64), value.as_str()) {
        if (s.chars().count() as u64) < min {
            push(format!("must be at least {} character(s) long", min));
        }
    }

    match value {
        Value::Object(map) => {
            for name in schema.required.iter().flatten() {
                if !map.contains_key(name) {
                    out.push(Violation {
                        path: join(path, name),
                        reason: "required property is missing".to_string(),
                    });
                }
            }

            let declared = schema.properties.as_ref().and_then(Value::as_object);
            for (key, child) in map {
                match schema.property_schema(key) {
                    Some(child_schema) => check(&child_schema, child, &join(path, key), out),
                    None if schema.additional_properties == Some(false)
                        && declared.is_some() =>
                    {
                        out.push(Violation {
                            path: join(path, key),
                            reason: "unknown property".to_string(),
                        })
                    }
                    None => {}
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.items() {
                for (index, item) in items.iter().enumerate() {
                    check(&item_schema, item, &format!("{}[{}]", path, index), out);
                }
            }
        }
        _ => {}
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, key: &str) -> String {
    if path == ROOT {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}
