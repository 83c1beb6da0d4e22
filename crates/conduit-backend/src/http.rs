//! HTTP implementation of [`BrowserBackend`]

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{BackendError, BackendResponse, BackendResult, BrowserBackend, BrowserCall};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`HttpBackend`]
#[derive(Clone)]
pub struct HttpBackendConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

impl HttpBackendConfig {
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// Browser backend reached over its REST API
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

struct Route {
    method: Method,
    segments: Vec<String>,
    body: Option<Value>,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> BackendResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BackendError::Configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Configuration(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth: reqwest::header::HeaderValue =
            format!("Bearer {}", config.api_key.expose_secret())
                .parse()
                .map_err(|_| BackendError::Configuration("Invalid API key format".into()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, segments: &[String]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Configuration("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn route(call: BrowserCall) -> Route {
        match call {
            BrowserCall::CreateSession { configuration } => Route {
                method: Method::POST,
                segments: segments(&["sessions"]),
                body: Some(json!({ "configuration": configuration })),
            },
            BrowserCall::TerminateSession { session_id } => Route {
                method: Method::DELETE,
                segments: vec!["sessions".into(), session_id],
                body: None,
            },
            BrowserCall::SaveProfileOnTermination {
                session_id,
                profile_name,
            } => Route {
                method: Method::PUT,
                segments: vec![
                    "sessions".into(),
                    session_id,
                    "save-profile-on-termination".into(),
                    profile_name,
                ],
                body: None,
            },
            BrowserCall::CreateWindow { session_id, url } => Route {
                method: Method::POST,
                segments: vec!["sessions".into(), session_id, "windows".into()],
                body: Some(json!({ "url": url })),
            },
            BrowserCall::GetWindowInfo {
                session_id,
                window_id,
            } => Route {
                method: Method::GET,
                segments: window_segments(session_id, window_id, None),
                body: None,
            },
            BrowserCall::PageQuery {
                session_id,
                window_id,
                prompt,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("page-query")),
                body: Some(json!({ "prompt": prompt })),
            },
            BrowserCall::PaginatedExtraction {
                session_id,
                window_id,
                prompt,
                output_schema,
            } => {
                let mut body = object(&[("prompt", Some(Value::String(prompt)))]);
                if let Some(schema) = output_schema {
                    let schema = match schema {
                        Value::String(raw) => raw,
                        other => other.to_string(),
                    };
                    body.insert(
                        "configuration".into(),
                        json!({ "outputSchema": schema }),
                    );
                }
                Route {
                    method: Method::POST,
                    segments: window_segments(session_id, window_id, Some("paginated-extraction")),
                    body: Some(Value::Object(body)),
                }
            }
            BrowserCall::Click {
                session_id,
                window_id,
                element_description,
                coordinate,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("click")),
                body: Some(Value::Object(object(&[
                    ("elementDescription", Some(Value::String(element_description))),
                    ("coordinate", coordinate.map(|c| json!({ "x": c.x, "y": c.y }))),
                ]))),
            },
            BrowserCall::Scroll {
                session_id,
                window_id,
                element_description,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("scroll")),
                body: Some(Value::Object(object(&[(
                    "scrollToElement",
                    element_description.map(Value::String),
                )]))),
            },
            BrowserCall::Type {
                session_id,
                window_id,
                text,
                element_description,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("type")),
                body: Some(Value::Object(object(&[
                    ("text", Some(Value::String(text))),
                    ("elementDescription", element_description.map(Value::String)),
                ]))),
            },
            BrowserCall::Scrape {
                session_id,
                window_id,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("scrape-content")),
                body: Some(json!({})),
            },
            BrowserCall::FileInput {
                session_id,
                window_id,
                element_description,
                file_path,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("file-input")),
                body: Some(json!({
                    "elementDescription": element_description,
                    "filePath": file_path,
                })),
            },
            BrowserCall::Monitor {
                session_id,
                window_id,
                condition,
                timeout_seconds,
            } => Route {
                method: Method::POST,
                segments: window_segments(session_id, window_id, Some("monitor")),
                body: Some(json!({
                    "condition": condition,
                    "configuration": { "timeoutSeconds": timeout_seconds },
                })),
            },
        }
    }

    fn interpret(status: reqwest::StatusCode, body: &str) -> BackendResult<BackendResponse> {
        if body.trim().is_empty() {
            return if status.is_success() {
                Ok(BackendResponse::default())
            } else {
                Err(BackendError::Http {
                    status: status.as_u16(),
                    body: String::new(),
                })
            };
        }

        match serde_json::from_str::<Value>(body) {
            Ok(value @ Value::Object(_)) => {
                let response: BackendResponse = serde_json::from_value(value)
                    .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
                if status.is_success() || response.has_errors() {
                    Ok(response)
                } else {
                    Err(BackendError::Http {
                        status: status.as_u16(),
                        body: body.to_string(),
                    })
                }
            }
            Ok(other) if status.is_success() => Ok(BackendResponse::with_data(other)),
            Err(_) if status.is_success() => {
                Ok(BackendResponse::with_data(Value::String(body.to_string())))
            }
            _ => Err(BackendError::Http {
                status: status.as_u16(),
                body: body.to_string(),
            }),
        }
    }
}

#[async_trait]
impl BrowserBackend for HttpBackend {
    async fn call(&self, call: BrowserCall) -> BackendResult<BackendResponse> {
        let operation = call.name();
        let Route {
            method,
            segments,
            body,
        } = Self::route(call);
        let url = self.url_for(&segments)?;

        debug!(operation, %method, %url, "calling browser backend");

        let mut request = self.client.request(method, url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let result = Self::interpret(status, &text);
        match &result {
            Ok(resp) if resp.has_errors() => {
                warn!(operation, status = status.as_u16(), "backend reported errors")
            }
            Err(error) => warn!(operation, %error, "backend call failed"),
            Ok(_) => {}
        }
        result
    }
}

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn window_segments(session_id: String, window_id: String, action: Option<&str>) -> Vec<String> {
    let mut parts = vec!["sessions".into(), session_id, "windows".into(), window_id];
    if let Some(action) = action {
        parts.push(action.to_string());
    }
    parts
}

/// Object built from the fields that are present.
fn object(fields: &[(&str, Option<Value>)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
        .collect()
}
