//! Telegram notification channel.
//!
//! Delivers produced content to a fixed chat using MarkdownV2. Telegram's
//! MarkdownV2 dialect requires escaping most punctuation, but generated text
//! uses `**bold**` emphasis that must survive as real bold, so bold spans are
//! converted to single-asterisk MarkdownV2 bold around the escaping pass
//! instead of being escaped away.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use herald_core::notify::NotificationChannel;
use herald_types::config::TelegramConfig;
use herald_types::error::NotifyError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Characters MarkdownV2 requires escaping outside of entities.
const SPECIALS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

fn escape_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text for MarkdownV2, preserving `**bold**` spans as bold.
///
/// Unbalanced `**` markers are treated as literal text and escaped.
pub fn escape_markdown_v2(text: &str) -> String {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        return escape_plain(text);
    }
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let escaped = escape_plain(part);
            if i % 2 == 1 {
                format!("*{escaped}*")
            } else {
                escaped
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Notification channel backed by the Telegram Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: SecretString,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            token,
            chat_id: config.chat_id.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl NotificationChannel for TelegramNotifier {
    #[tracing::instrument(skip_all, fields(len = text.len()))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.base_url,
            self.token.expose_secret()
        );
        let body = SendMessageRequest {
            chat_id: self.chat_id.clone(),
            text: escape_markdown_v2(text),
            parse_mode: "MarkdownV2",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!("HTTP {status}: {body}")));
        }
        let parsed: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Delivery(format!("failed to parse response: {e}")))?;
        if !parsed.ok {
            return Err(NotifyError::Delivery(
                parsed.description.unwrap_or_else(|| "not ok".to_string()),
            ));
        }
        Ok(())
    }
}
