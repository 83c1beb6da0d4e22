use async_trait::async_trait;
use std::sync::Arc;

use crate::{BackendResponse, BackendResult, BrowserCall};

/// Capability provider for browser sessions, windows and page actions.
///
/// Implementations return `Ok` whenever the backend answered with a
/// well-formed body, including bodies that carry an `errors` collection.
/// `Err` is reserved for transport, status and decoding failures.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    async fn call(&self, call: BrowserCall) -> BackendResult<BackendResponse>;
}

pub type SharedBackend = Arc<dyn BrowserBackend>;
