//! Process-wide registry of live connections, keyed by participant identifier.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

/// One live connection's outbound queue. The WebSocket writer task drains the
/// other end of `tx` into the socket.
pub struct ConnectionHandle {
    pub id: String,
    tx: mpsc::Sender<String>,
}

impl ConnectionHandle {
    pub fn new(id: String, tx: mpsc::Sender<String>) -> Self {
        Self { id, tx }
    }

    /// Queue a frame for delivery without waiting. Returns `false` when the
    /// queue is full or the writer task is gone; the frame is dropped.
    pub fn send(&self, frame: String) -> bool {
        self.tx.try_send(frame).is_ok()
    }
}

/// At most one live connection per identifier: a new registration supersedes
/// any existing entry, and `unregister` only removes the caller's own entry,
/// so a stale close can never evict a newer live connection.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Arc<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Install `handle` under its identifier, superseding any previous entry.
    /// The superseded connection is not closed here; its own receive loop
    /// notices the dead transport and cleans up.
    pub async fn register(&self, handle: Arc<ConnectionHandle>) {
        let mut conns = self.connections.write().await;
        let _ = conns.insert(handle.id.clone(), handle);
    }

    pub async fn lookup(&self, id: &str) -> Option<Arc<ConnectionHandle>> {
        self.connections.read().await.get(id).cloned()
    }

    /// Remove the entry for `handle` only if it is still the registered
    /// connection for its identifier.
    pub async fn unregister(&self, handle: &Arc<ConnectionHandle>) {
        let mut conns = self.connections.write().await;
        if let Some(current) = conns.get(&handle.id) {
            if Arc::ptr_eq(current, handle) {
                let _ = conns.remove(&handle.id);
            }
        }
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
