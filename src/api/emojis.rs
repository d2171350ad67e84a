use axum::{
    Json, debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::collab::Clients;

use super::upstream_error;

const DEFAULT_LIMIT: usize = 10;

#[derive(Deserialize)]
pub(crate) struct EmojiSearchRequest {
    #[serde(default)]
    text: String,
    limit: Option<usize>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn search_emojis(
    State(collab): State<Clients>,

    Json(EmojiSearchRequest { text, limit }): Json<EmojiSearchRequest>,
) -> Response {
    match collab.search_emojis(&text, limit.unwrap_or(DEFAULT_LIMIT)).await {
        Ok(emojis) => Json(json!({"status": "success", "emojis": emojis})).into_response(),
        Err(err) => upstream_error(err),
    }
}
