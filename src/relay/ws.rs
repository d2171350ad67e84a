use std::sync::Arc;
use std::time::Duration;

use axum::{
    debug_handler,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::history::HistoryStore;
use crate::pair::Participant;
use crate::registry::{ConnectionHandle, ConnectionRegistry};

use super::msg;

const OUTBOUND_QUEUE: usize = 64;

#[debug_handler(state = crate::AppState)]
pub async fn pair_ws(
    Path(client_id): Path<String>,
    State(registry): State<Arc<ConnectionRegistry>>,
    State(history): State<HistoryStore>,
    State(config): State<Config>,

    ws: WebSocketUpgrade,
) -> Response {
    // Admission: the claimed identifier must be well-formed. That is the
    // whole credential check; authentication proper is out of scope.
    if let Err(reject) = Participant::parse(&client_id) {
        tracing::debug!(%client_id, reason = %reject, "refusing connection");
        return (StatusCode::BAD_REQUEST, reject.to_string()).into_response();
    }

    let idle_window = config.idle_window;
    ws.on_upgrade(move |stream| session(stream, client_id, registry, history, idle_window))
        .into_response()
}

async fn session(
    stream: WebSocket,
    client_id: String,
    registry: Arc<ConnectionRegistry>,
    history: HistoryStore,
    idle_window: Duration,
) {
    let (mut sender, mut receiver) = stream.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let conn = Arc::new(ConnectionHandle::new(client_id.clone(), tx));
    registry.register(conn.clone()).await;
    tracing::info!(%client_id, "connected");

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(frame.into()).await.is_err() {
                break;
            }
        }
    });

    loop {
        match tokio::time::timeout(idle_window, receiver.next()).await {
            Ok(Some(Ok(WsMessage::Text(text)))) => {
                let _ = msg::handle_frame(&history, &registry, &conn, text.as_str()).await;
            }
            // Binary and control frames are not part of the protocol.
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(err))) => {
                tracing::debug!(%client_id, error = %err, "transport error");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::info!(%client_id, "idle window elapsed, closing");
                break;
            }
        }
    }

    writer.abort();
    registry.unregister(&conn).await;
    tracing::info!(%client_id, "disconnected");
}
