use axum::{
    Json, debug_handler,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::{collab::Clients, config::Config, pair::Role};

use super::{client_error, images::read_image, upstream_error};

#[derive(Deserialize)]
pub(crate) struct AnalyzeTextRequest {
    text: String,
    role: Role,
    #[serde(default)]
    context: Vec<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn analyze_text(
    State(collab): State<Clients>,

    Json(AnalyzeTextRequest { text, role, context }): Json<AnalyzeTextRequest>,
) -> Response {
    if text.trim().is_empty() {
        return client_error("text must not be empty");
    }

    match collab.analyze_text(&text, role, &context).await {
        Ok(analysis) => Json(json!({"status": "success", "analysis": analysis})).into_response(),
        Err(err) => upstream_error(err),
    }
}

#[derive(Deserialize)]
pub(crate) struct AnalyzeEmojiRequest {
    image_url: String,
    role: Role,
    #[serde(default)]
    context: Vec<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn analyze_emoji(
    State(collab): State<Clients>,

    Json(AnalyzeEmojiRequest { image_url, role, context }): Json<AnalyzeEmojiRequest>,
) -> Response {
    match collab.analyze_image(&image_url, role, &context).await {
        Ok(analysis) => Json(json!({"status": "success", "analysis": analysis})).into_response(),
        Err(err) => upstream_error(err),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn analyze_image(
    State(collab): State<Clients>,
    State(config): State<Config>,

    mut multipart: Multipart,
) -> Response {
    let (bytes, content_type) = match read_image(&mut multipart, config.max_image_bytes).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    // The inference service takes the image inline as a data URL. This flow
    // explains a received meme to the elder side, so that is the role used.
    let image_ref = format!(
        "data:{content_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );
    match collab.analyze_image(&image_ref, Role::Elder, &[]).await {
        Ok(analysis) => Json(json!({"status": "success", "analysis": analysis})).into_response(),
        Err(err) => upstream_error(err),
    }
}
