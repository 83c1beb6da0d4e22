//! Requests and responses exchanged with the browser backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Options accepted when creating a browser session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfiguration {
    /// Browser profile to load, and to save back on termination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,

    /// `true` for the backend's default proxy, or a provider-specific object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solve_captcha: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// One operation forwarded to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    CreateSession {
        configuration: SessionConfiguration,
    },
    TerminateSession {
        session_id: String,
    },
    SaveProfileOnTermination {
        session_id: String,
        profile_name: String,
    },
    CreateWindow {
        session_id: String,
        url: String,
    },
    GetWindowInfo {
        session_id: String,
        window_id: String,
    },
    PageQuery {
        session_id: String,
        window_id: String,
        prompt: String,
    },
    PaginatedExtraction {
        session_id: String,
        window_id: String,
        prompt: String,
        output_schema: Option<Value>,
    },
    Click {
        session_id: String,
        window_id: String,
        element_description: String,
        coordinate: Option<Coordinate>,
    },
    Scroll {
        session_id: String,
        window_id: String,
        element_description: Option<String>,
    },
    Type {
        session_id: String,
        window_id: String,
        text: String,
        element_description: Option<String>,
    },
    Scrape {
        session_id: String,
        window_id: String,
    },
    FileInput {
        session_id: String,
        window_id: String,
        element_description: String,
        file_path: String,
    },
    Monitor {
        session_id: String,
        window_id: String,
        condition: String,
        timeout_seconds: u64,
    },
}

impl BrowserCall {
    /// Stable operation name used in logs and by test doubles.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "create_session",
            Self::TerminateSession { .. } => "terminate_session",
            Self::SaveProfileOnTermination { .. } => "save_profile_on_termination",
            Self::CreateWindow { .. } => "create_window",
            Self::GetWindowInfo { .. } => "get_window_info",
            Self::PageQuery { .. } => "page_query",
            Self::PaginatedExtraction { .. } => "paginated_extraction",
            Self::Click { .. } => "click",
            Self::Scroll { .. } => "scroll",
            Self::Type { .. } => "type",
            Self::Scrape { .. } => "scrape",
            Self::FileInput { .. } => "file_input",
            Self::Monitor { .. } => "monitor",
        }
    }
}

/// Body returned by every backend endpoint.
///
/// A non-empty `errors` collection means the call failed even when the HTTP
/// status was successful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub warnings: Vec<Value>,
}

impl BackendResponse {
    pub fn with_data(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_errors(errors: Vec<Value>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// String field of `data`, e.g. `id` or `windowId`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
