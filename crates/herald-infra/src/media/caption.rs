//! Imgflip meme-caption client.
//!
//! Imgflip reports errors inside a 200 response (`success: false`), so both
//! the HTTP status and the payload flag are checked. Only templates with
//! exactly two text boxes are offered, since the render call fills a top and
//! a bottom text.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use herald_core::media::CaptionService;
use herald_types::config::MediaConfig;
use herald_types::error::MediaError;
use herald_types::media::MemeTemplate;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct GetMemesResponse {
    success: bool,
    #[serde(default)]
    data: Option<MemesData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemesData {
    memes: Vec<ImgflipMeme>,
}

#[derive(Debug, Deserialize)]
struct ImgflipMeme {
    id: String,
    name: String,
    box_count: u32,
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    success: bool,
    #[serde(default)]
    data: Option<CaptionData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionData {
    url: String,
}

/// Caption-service client for the Imgflip API.
pub struct ImgflipClient {
    client: reqwest::Client,
    base_url: String,
    username: SecretString,
    password: SecretString,
}

impl ImgflipClient {
    pub fn new(config: &MediaConfig, username: SecretString, password: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            base_url: config.caption_base_url.trim_end_matches('/').to_string(),
            username,
            password,
        }
    }

    async fn get_two_box_memes(&self) -> Result<Vec<ImgflipMeme>, MediaError> {
        let response = self
            .client
            .get(format!("{}/get_memes", self.base_url))
            .send()
            .await
            .map_err(|e| MediaError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: GetMemesResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(format!("failed to parse response: {e}")))?;
        if !parsed.success {
            return Err(MediaError::Request(
                parsed.error_message.unwrap_or_else(|| "not ok".to_string()),
            ));
        }
        Ok(parsed
            .data
            .map(|d| d.memes)
            .unwrap_or_default()
            .into_iter()
            .filter(|m| m.box_count == 2)
            .collect())
    }
}

#[async_trait]
impl CaptionService for ImgflipClient {
    async fn list_two_box_templates(&self) -> Result<Vec<String>, MediaError> {
        Ok(self
            .get_two_box_memes()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    async fn find_template(&self, name: &str) -> Result<Option<MemeTemplate>, MediaError> {
        let needle = name.to_lowercase();
        Ok(self
            .get_two_box_memes()
            .await?
            .into_iter()
            .find(|m| m.name.to_lowercase().contains(&needle))
            .map(|m| MemeTemplate {
                id: m.id,
                name: m.name,
            }))
    }

    #[tracing::instrument(skip(self))]
    async fn render(
        &self,
        template_id: &str,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<String, MediaError> {
        let form = [
            ("template_id", template_id),
            ("username", self.username.expose_secret()),
            ("password", self.password.expose_secret()),
            ("text0", top_text),
            ("text1", bottom_text),
        ];
        let response = self
            .client
            .post(format!("{}/caption_image", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| MediaError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: CaptionResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(format!("failed to parse response: {e}")))?;
        match parsed.data {
            Some(data) if parsed.success => Ok(data.url),
            _ => Err(MediaError::Generation(
                parsed
                    .error_message
                    .unwrap_or_else(|| "caption render failed".to_string()),
            )),
        }
    }
}
