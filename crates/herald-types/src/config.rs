//! Application configuration.
//!
//! Deserialized from `herald.toml` by `herald-infra`; every section and field
//! has a default so a missing or partial file still yields a runnable config.
//! API keys are NOT stored here -- each section names the environment
//! variable that carries its secret.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Herald pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Text-generation collaborator settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model used for classification, extraction, and content generation.
    #[serde(default = "default_interaction_model")]
    pub interaction_model: String,
    /// Smaller model used for acknowledgment messages.
    #[serde(default = "default_notification_model")]
    pub notification_model: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            interaction_model: default_interaction_model(),
            notification_model: default_notification_model(),
            api_key_env: default_llm_api_key_env(),
        }
    }
}

/// News-search collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,
    /// Result freshness window passed to the provider.
    #[serde(default = "default_freshness")]
    pub freshness: String,
    /// Results requested per query.
    #[serde(default = "default_per_query_limit")]
    pub per_query_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            api_key_env: default_search_api_key_env(),
            freshness: default_freshness(),
            per_query_limit: default_per_query_limit(),
        }
    }
}

/// Bounded-concurrency web-retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum simultaneous in-flight fetches.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per URL (first try included).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_fetch_timeout_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

/// Vector-store collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default = "default_vector_base_url")]
    pub base_url: String,
    #[serde(default = "default_vector_api_key_env")]
    pub api_key_env: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_vector_base_url(),
            api_key_env: default_vector_api_key_env(),
        }
    }
}

/// Notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_telegram_token_env")]
    pub api_token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            chat_id: String::new(),
            api_token_env: default_telegram_token_env(),
        }
    }
}

/// Image, video, and caption collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_image_api_key_env")]
    pub image_api_key_env: String,
    #[serde(default = "default_image_deployment")]
    pub image_deployment: String,
    #[serde(default = "default_video_base_url")]
    pub video_base_url: String,
    #[serde(default = "default_video_api_key_env")]
    pub video_api_key_env: String,
    #[serde(default = "default_caption_base_url")]
    pub caption_base_url: String,
    #[serde(default = "default_caption_username_env")]
    pub caption_username_env: String,
    #[serde(default = "default_caption_password_env")]
    pub caption_password_env: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_base_url: default_image_base_url(),
            image_api_key_env: default_image_api_key_env(),
            image_deployment: default_image_deployment(),
            video_base_url: default_video_base_url(),
            video_api_key_env: default_video_api_key_env(),
            caption_base_url: default_caption_base_url(),
            caption_username_env: default_caption_username_env(),
            caption_password_env: default_caption_password_env(),
        }
    }
}

/// Inbound HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_interaction_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_notification_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_llm_api_key_env() -> String {
    "HERALD_LLM_API_KEY".to_string()
}

fn default_search_base_url() -> String {
    "https://api.bing.microsoft.com/v7.0/news/search".to_string()
}

fn default_search_api_key_env() -> String {
    "HERALD_SEARCH_API_KEY".to_string()
}

fn default_freshness() -> String {
    "Month".to_string()
}

fn default_per_query_limit() -> usize {
    5
}

fn default_max_concurrent() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_vector_base_url() -> String {
    "https://api.vectara.io/v2".to_string()
}

fn default_vector_api_key_env() -> String {
    "HERALD_VECTOR_API_KEY".to_string()
}

fn default_telegram_token_env() -> String {
    "HERALD_TELEGRAM_TOKEN".to_string()
}

fn default_image_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_image_api_key_env() -> String {
    "HERALD_IMAGE_API_KEY".to_string()
}

fn default_image_deployment() -> String {
    "dall-e-3".to_string()
}

fn default_video_base_url() -> String {
    "https://api.dev.runwayml.com/v1".to_string()
}

fn default_video_api_key_env() -> String {
    "HERALD_VIDEO_API_KEY".to_string()
}

fn default_caption_base_url() -> String {
    "https://api.imgflip.com".to_string()
}

fn default_caption_username_env() -> String {
    "HERALD_CAPTION_USERNAME".to_string()
}

fn default_caption_password_env() -> String {
    "HERALD_CAPTION_PASSWORD".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8780".to_string()
}
