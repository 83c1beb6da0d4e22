//! Locally tracked metadata for backend sessions

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// What we remember about a session between creation and termination
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetadata {
    pub session_id: String,
    pub profile_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Keyed store of session metadata.
///
/// The backend owns the real session lifecycle. Losing an entry only skips
/// the profile save on termination.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionMetadata>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `session_id`.
    pub async fn track(&self, session_id: impl Into<String>, profile_name: Option<String>) {
        let session_id = session_id.into();
        let metadata = SessionMetadata {
            session_id: session_id.clone(),
            profile_name,
            created_at: Utc::now(),
        };
        self.sessions.write().await.insert(session_id, metadata);
    }

    /// Remove the entry; a missing entry is not an error.
    pub async fn release(&self, session_id: &str) -> Option<SessionMetadata> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn lookup(&self, session_id: &str) -> Option<SessionMetadata> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
