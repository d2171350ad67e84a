mod analyze;
mod emojis;
mod images;
mod messages;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{AppState, collab::CollabError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get_messages", get(messages::get_messages))
        .route("/analyze_text", post(analyze::analyze_text))
        .route("/analyze_emoji", post(analyze::analyze_emoji))
        .route("/analyze_image", post(analyze::analyze_image))
        .route("/upload_image", post(images::upload_image))
        .route("/search_emojis", post(emojis::search_emojis))
}

pub(crate) fn client_error(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "detail": detail})),
    )
        .into_response()
}

pub(crate) fn upstream_error(err: CollabError) -> Response {
    tracing::warn!(error = %err, "collaborator call failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"status": "error", "detail": err.to_string()})),
    )
        .into_response()
}
