//! Live SSE connections keyed by connection id

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::error::GatewayError;

/// Outbound frames buffered per connection before senders wait.
const CHANNEL_CAPACITY: usize = 32;

type Entries = HashMap<String, mpsc::Sender<String>>;

/// Keyed store of open event streams.
///
/// The lock is only held for insert, remove and lookup, so it can be taken
/// from `Drop`.
pub struct ConnectionRegistry {
    entries: Mutex<Entries>,
    max_connections: usize,
}

impl ConnectionRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_connections,
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate an id and register its stream.
    ///
    /// The returned guard removes the entry when dropped; the receiver yields
    /// the serialized responses to stream to the client.
    pub fn open(
        self: &Arc<Self>,
    ) -> Result<(ConnectionGuard, mpsc::Receiver<String>), GatewayError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let id = Uuid::new_v4().to_string();

        {
            let mut entries = self.entries();
            if entries.len() >= self.max_connections {
                return Err(GatewayError::MaxConnectionsReached(self.max_connections));
            }
            entries.insert(id.clone(), tx);
        }

        debug!(connection_id = %id, "connection opened");
        Ok((
            ConnectionGuard {
                id,
                registry: self.clone(),
                closed: false,
            },
            rx,
        ))
    }

    /// Sender for an active connection.
    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<String>> {
        self.entries().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every sender so open streams finish. Used on shutdown.
    pub fn close_all(&self) {
        let drained: Vec<String> = self.entries().drain().map(|(id, _)| id).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "closed all connections");
        }
    }

    fn remove(&self, id: &str) -> bool {
        self.entries().remove(id).is_some()
    }
}

/// Cancellation handle for one registered connection.
pub struct ConnectionGuard {
    id: String,
    registry: Arc<ConnectionRegistry>,
    closed: bool,
}

impl ConnectionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remove the entry now. Calling it again, or dropping afterwards, is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.registry.remove(&self.id) {
            debug!(connection_id = %self.id, "connection closed");
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.close();
    }
}
