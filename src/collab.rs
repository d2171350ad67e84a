//! Clients for the external collaborators: the inference service, the image
//! object store, and the emoji search service. All are narrow
//! request/response calls; a failure here is that request's problem and never
//! the relay's.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::pair::Role;

#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("collaborator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("collaborator returned an unusable response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiHit {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct Clients {
    http: reqwest::Client,
    inference_url: String,
    api_key: String,
    storage_url: String,
    emoji_search_url: String,
}

impl Clients {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            inference_url: config.inference_url.clone(),
            api_key: config.inference_api_key.clone(),
            storage_url: config.storage_url.clone(),
            emoji_search_url: config.emoji_search_url.clone(),
        }
    }

    /// Annotate a text message for the given role, with recent messages as
    /// context.
    pub async fn analyze_text(
        &self,
        text: &str,
        role: Role,
        context: &[String],
    ) -> Result<String, CollabError> {
        self.annotation(
            format!("{}/analyze_text", self.inference_url),
            json!({ "text": text, "role": role, "context": context }),
        )
        .await
    }

    /// Annotate an image by reference (a stored URL or a data URL).
    pub async fn analyze_image(
        &self,
        image_ref: &str,
        role: Role,
        context: &[String],
    ) -> Result<String, CollabError> {
        self.annotation(
            format!("{}/analyze_image", self.inference_url),
            json!({ "image": image_ref, "role": role, "context": context }),
        )
        .await
    }

    async fn annotation(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<String, CollabError> {
        let mut request = self.http.post(url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response: serde_json::Value =
            request.send().await?.error_for_status()?.json().await?;
        response
            .get("analysis")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| CollabError::BadResponse("missing analysis field".into()))
    }

    /// Hand image bytes to the object store; returns the stored URL.
    pub async fn store_image(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CollabError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("upload")
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let response: serde_json::Value = self
            .http
            .post(format!("{}/store", self.storage_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response
            .get("url")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| CollabError::BadResponse("missing url field".into()))
    }

    pub async fn search_emojis(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<EmojiHit>, CollabError> {
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            emojis: Vec<EmojiHit>,
        }

        let response: SearchResponse = self
            .http
            .post(format!("{}/search", self.emoji_search_url))
            .json(&json!({ "text": text, "limit": limit }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.emojis)
    }
}
