use std::sync::Arc;

use crate::history::HistoryStore;
use crate::registry::{ConnectionHandle, ConnectionRegistry};

use super::frame::Frame;

pub const PONG: &str = r#"{"type":"pong"}"#;

/// What became of one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Heartbeat, answered in place.
    Pong,
    /// Persisted and pushed to the recipient's live connection.
    Forwarded,
    /// Persisted; the recipient is offline and will see it on history replay.
    StoredOnly,
    /// Failed pair authorization; neither stored nor forwarded.
    Rejected,
    /// Not decodable as a frame at all.
    Dropped,
}

/// Process one inbound frame from `conn`.
///
/// Heartbeats short-circuit. Content frames run pair authorization, then the
/// append and the forward as independent steps: a message that fails to
/// persist is still offered to the recipient, and a message to an offline
/// recipient still lands in history.
pub async fn handle_frame(
    history: &HistoryStore,
    registry: &ConnectionRegistry,
    conn: &Arc<ConnectionHandle>,
    text: &str,
) -> Outcome {
    let Ok(frame) = serde_json::from_str::<Frame>(text) else {
        tracing::debug!(conn = %conn.id, "dropping undecodable frame");
        return Outcome::Dropped;
    };

    if frame.is_ping() {
        if !conn.send(PONG.to_owned()) {
            tracing::debug!(conn = %conn.id, "pong not queued");
        }
        return Outcome::Pong;
    }

    let msg = match frame.into_message() {
        Ok(msg) => msg,
        Err(reject) => {
            tracing::debug!(conn = %conn.id, reason = %reject, "frame rejected");
            return Outcome::Rejected;
        }
    };

    if let Err(err) = history.append(&msg).await {
        tracing::warn!(
            pair_id = %msg.pair_id,
            message_id = msg.id,
            error = %err,
            "message lost to storage, forwarding anyway",
        );
    }

    match registry.lookup(&msg.to).await {
        Some(peer) => {
            if !peer.send(text.to_owned()) {
                tracing::warn!(conn = %peer.id, "recipient queue full, frame not delivered");
            }
            Outcome::Forwarded
        }
        None => Outcome::StoredOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tokio::sync::mpsc;

    async fn memory_store() -> HistoryStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = HistoryStore::new(pool);
        store.ensure_schema().await.unwrap();
        store
    }

    fn make_handle(id: &str) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (Arc::new(ConnectionHandle::new(id.into(), tx)), rx)
    }

    #[tokio::test]
    async fn ping_gets_exactly_one_pong_and_no_history() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (conn, mut rx) = make_handle("elder_7");

        let outcome = handle_frame(&history, &registry, &conn, r#"{"type":"ping"}"#).await;
        assert_eq!(outcome, Outcome::Pong);
        assert_eq!(rx.try_recv().unwrap(), PONG);
        assert!(rx.try_recv().is_err());
        assert!(history.read("7", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_to_online_recipient_is_forwarded_verbatim_and_stored() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (elder, _elder_rx) = make_handle("elder_7");
        let (young, mut young_rx) = make_handle("young_7");
        registry.register(young).await;

        let text = r#"{"id":1,"from":"elder_7","to":"young_7","type":"text","message":"hello","pair_id":"7"}"#;
        let outcome = handle_frame(&history, &registry, &elder, text).await;
        assert_eq!(outcome, Outcome::Forwarded);
        assert_eq!(young_rx.try_recv().unwrap(), text);

        let records = history.read("7", 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "hello");
    }

    #[tokio::test]
    async fn offline_recipient_still_lands_in_history() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (elder, _rx) = make_handle("elder_7");

        let text = r#"{"id":1,"from":"elder_7","to":"young_7","type":"text","message":"hello","pair_id":"7"}"#;
        let outcome = handle_frame(&history, &registry, &elder, text).await;
        assert_eq!(outcome, Outcome::StoredOnly);
        assert_eq!(history.read("7", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_frame_is_neither_stored_nor_forwarded() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (elder, _rx) = make_handle("elder_7");
        let (young, mut young_rx) = make_handle("young_9");
        registry.register(young).await;

        let text = r#"{"id":2,"from":"elder_7","to":"young_9","type":"text","message":"hi","pair_id":"7"}"#;
        let outcome = handle_frame(&history, &registry, &elder, text).await;
        assert_eq!(outcome, Outcome::Rejected);
        assert!(young_rx.try_recv().is_err());
        assert!(history.read("7", 10).await.unwrap().is_empty());
        assert!(history.read("9", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_is_dropped_quietly() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (conn, mut rx) = make_handle("elder_7");

        assert_eq!(handle_frame(&history, &registry, &conn, "not json").await, Outcome::Dropped);
        assert_eq!(handle_frame(&history, &registry, &conn, "[1,2,3]").await, Outcome::Dropped);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn two_pings_then_text_is_two_pongs_one_message() {
        let history = memory_store().await;
        let registry = ConnectionRegistry::new();
        let (elder, mut elder_rx) = make_handle("elder_7");

        assert_eq!(handle_frame(&history, &registry, &elder, r#"{"type":"ping"}"#).await, Outcome::Pong);
        assert_eq!(handle_frame(&history, &registry, &elder, r#"{"type":"ping"}"#).await, Outcome::Pong);
        let text = r#"{"id":3,"from":"elder_7","to":"young_7","type":"text","message":"hey","pair_id":"7"}"#;
        assert_eq!(handle_frame(&history, &registry, &elder, text).await, Outcome::StoredOnly);

        assert_eq!(elder_rx.try_recv().unwrap(), PONG);
        assert_eq!(elder_rx.try_recv().unwrap(), PONG);
        assert!(elder_rx.try_recv().is_err());
        assert_eq!(history.read("7", 10).await.unwrap().len(), 1);
    }
}
