//! In-memory backend for tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{BackendError, BackendResponse, BackendResult, BrowserBackend, BrowserCall};

enum Scripted {
    Respond(BackendResponse),
    Fail(String),
}

/// Backend double that records every call and answers from a script.
///
/// Operations without a scripted answer succeed: session creation returns
/// `ses_N`, window creation returns `win_N`, everything else returns `{}`.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<BrowserCall>>,
    scripted: Mutex<HashMap<&'static str, Scripted>>,
    next_id: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `operation` call with `response`.
    pub fn respond_with(self, operation: &'static str, response: BackendResponse) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(operation, Scripted::Respond(response));
        self
    }

    /// Fail every `operation` call with a transport-level error.
    pub fn fail_with(self, operation: &'static str, message: impl Into<String>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(operation, Scripted::Fail(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.name()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn default_response(&self, call: &BrowserCall) -> BackendResponse {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        match call {
            BrowserCall::CreateSession { .. } => {
                BackendResponse::with_data(json!({ "id": format!("ses_{}", n), "status": "running" }))
            }
            BrowserCall::CreateWindow { url, .. } => BackendResponse::with_data(json!({
                "windowId": format!("win_{}", n),
                "targetId": format!("target_{}", n),
                "url": url,
            })),
            _ => BackendResponse::with_data(json!({})),
        }
    }
}

#[async_trait]
impl BrowserBackend for MockBackend {
    async fn call(&self, call: BrowserCall) -> BackendResult<BackendResponse> {
        self.calls.lock().unwrap().push(call.clone());

        let scripted = match self.scripted.lock().unwrap().get(call.name()) {
            Some(Scripted::Respond(response)) => Some(Ok(response.clone())),
            Some(Scripted::Fail(message)) => {
                Some(Err(BackendError::InvalidResponse(message.clone())))
            }
            None => None,
        };
        scripted.unwrap_or_else(|| Ok(self.default_response(&call)))
    }
}
