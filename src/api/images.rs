use axum::{
    Json, debug_handler,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{collab::Clients, config::Config};

use super::{client_error, upstream_error};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn upload_image(
    State(collab): State<Clients>,
    State(config): State<Config>,

    mut multipart: Multipart,
) -> Response {
    let (bytes, content_type) = match read_image(&mut multipart, config.max_image_bytes).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    match collab.store_image(bytes, &content_type).await {
        Ok(url) => Json(json!({"status": "success", "image_url": url})).into_response(),
        Err(err) => upstream_error(err),
    }
}

/// Pull the `image` field out of a multipart body, enforcing the image
/// content type and the configured size cap.
pub(crate) async fn read_image(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<(Vec<u8>, String), Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(client_error("missing image field")),
            Err(err) => return Err(client_error(&format!("unreadable multipart body: {err}"))),
        };

        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !content_type.starts_with("image/") {
            return Err(client_error("expected an image file"));
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Err(client_error(&format!("unreadable image: {err}"))),
        };
        if bytes.len() > max_bytes {
            return Err(client_error("image exceeds the size limit"));
        }

        return Ok((bytes.to_vec(), content_type));
    }
}
