//! Image-to-video client (Runway dialect).
//!
//! Submission and polling are separate calls; the poll cadence is owned by
//! the video processor, not by this client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use herald_core::media::VideoGenerator;
use herald_types::config::MediaConfig;
use herald_types::error::MediaError;
use herald_types::media::VideoTaskStatus;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "2024-11-06";

const VIDEO_MODEL: &str = "gen3a_turbo";

#[derive(Debug, Serialize)]
struct SubmitRequest {
    model: &'static str,
    #[serde(rename = "promptImage")]
    prompt_image: String,
    #[serde(rename = "promptText")]
    prompt_text: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    status: String,
    #[serde(default)]
    output: Vec<String>,
}

/// Video-generation client for the Runway API.
pub struct RunwayVideoClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl RunwayVideoClient {
    pub fn new(config: &MediaConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            api_key,
            base_url: config.video_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl VideoGenerator for RunwayVideoClient {
    #[tracing::instrument(skip_all)]
    async fn submit(&self, image_ref: &str, motion_prompt: &str) -> Result<String, MediaError> {
        let body = SubmitRequest {
            model: VIDEO_MODEL,
            prompt_image: image_ref.to_string(),
            prompt_text: motion_prompt.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/image_to_video", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Runway-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(format!("failed to parse response: {e}")))?;
        Ok(parsed.id)
    }

    async fn poll(&self, task_id: &str) -> Result<VideoTaskStatus, MediaError> {
        let response = self
            .client
            .get(format!("{}/tasks/{task_id}", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Runway-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| MediaError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: TaskResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(format!("failed to parse response: {e}")))?;
        match parsed.status.as_str() {
            "PENDING" | "THROTTLED" => Ok(VideoTaskStatus::Pending),
            "RUNNING" => Ok(VideoTaskStatus::Running),
            "SUCCEEDED" => parsed
                .output
                .into_iter()
                .next()
                .map(|output_url| VideoTaskStatus::Succeeded { output_url })
                .ok_or_else(|| MediaError::Parse("succeeded task had no output".to_string())),
            "FAILED" => Ok(VideoTaskStatus::Failed),
            other => Err(MediaError::Parse(format!("unknown task status '{other}'"))),
        }
    }
}
