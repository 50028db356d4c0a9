//! Image-generation client (OpenAI images dialect).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use herald_core::media::ImageGenerator;
use herald_types::config::MediaConfig;
use herald_types::error::MediaError;

// Generations can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Serialize)]
struct GenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
}

/// Image-generation client for OpenAI-compatible image endpoints.
pub struct OpenAiImageClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiImageClient {
    pub fn new(config: &MediaConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            api_key,
            base_url: config.image_base_url.trim_end_matches('/').to_string(),
            model: config.image_deployment.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    #[tracing::instrument(skip_all)]
    async fn generate(&self, prompt: &str) -> Result<String, MediaError> {
        let body = GenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE,
        };
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Generation(format!("HTTP {status}: {body}")));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(format!("failed to parse response: {e}")))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| MediaError::Generation("no image in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAiImageClient {
        let config = MediaConfig {
            image_base_url: server.uri(),
            ..MediaConfig::default()
        };
        OpenAiImageClient::new(&config, SecretString::from("image-key"))
    }

    #[tokio::test]
    async fn generate_posts_the_prompt_and_returns_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer image-key"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "prompt": "a lighthouse in a storm",
                "n": 1,
                "size": "1024x1024"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"url": "http://images.example/out.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = client(&server)
            .generate("a lighthouse in a storm")
            .await
            .unwrap();
        assert_eq!(url, "http://images.example/out.png");
    }

    #[tokio::test]
    async fn http_failure_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("content policy"))
            .mount(&server)
            .await;
        let err = client(&server).generate("anything").await.unwrap_err();
        assert!(matches!(err, MediaError::Generation(_)));
    }

    #[tokio::test]
    async fn empty_data_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        let err = client(&server).generate("anything").await.unwrap_err();
        assert!(matches!(err, MediaError::Generation(_)));
    }
}
