//! News-search client (Bing News Search dialect).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use herald_core::retrieval::SearchProvider;
use herald_types::config::SearchConfig;
use herald_types::document::SearchHit;
use herald_types::error::SearchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Hard per-request ceiling imposed by the API.
const MAX_COUNT: usize = 100;

/// Aggregator pages dominate results without this exclusion.
const QUERY_SUFFIX: &str = " -site:msn.com";

#[derive(Debug, Deserialize)]
struct NewsSearchResponse {
    #[serde(default)]
    value: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    name: String,
    url: String,
}

/// Search client for the Bing News Search API.
pub struct NewsSearchClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    freshness: String,
}

impl NewsSearchClient {
    pub fn new(config: &SearchConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            freshness: config.freshness.clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for NewsSearchClient {
    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, SearchError> {
        let q = format!("{query}{QUERY_SUFFIX}");
        let response = self
            .client
            .get(&self.base_url)
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .query(&[
                ("q", q.as_str()),
                ("count", &count.min(MAX_COUNT).to_string()),
                ("freshness", &self.freshness),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: NewsSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("failed to parse response: {e}")))?;
        Ok(parsed
            .value
            .into_iter()
            .map(|article| SearchHit {
                url: article.url,
                title: article.name,
            })
            .collect())
    }
}
