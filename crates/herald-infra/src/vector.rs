//! Vectara vector-store client.
//!
//! Documents are written as "core" documents with explicit parts so each
//! part embeds as one passage. Queries optionally go through the hosted
//! multilingual reranker; in that case twice the requested passages are
//! fetched and the list is truncated after reranking.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herald_core::vector::VectorStore;
use herald_types::config::VectorConfig;
use herald_types::document::RankedPassage;
use herald_types::error::VectorStoreError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const RERANKER_NAME: &str = "Rerank_Multilingual_v1";

#[derive(Debug, Serialize)]
struct CreateDocumentRequest {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    metadata: serde_json::Value,
    document_parts: Vec<DocumentPart>,
}

#[derive(Debug, Serialize)]
struct DocumentPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query: String,
    search: SearchSpec,
}

#[derive(Debug, Serialize)]
struct SearchSpec {
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    reranker: Option<RerankerSpec>,
}

#[derive(Debug, Serialize)]
struct RerankerSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    reranker_name: &'static str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    search_results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    text: String,
    #[serde(default)]
    document_metadata: serde_json::Value,
}

/// Vector-store client for the Vectara v2 API.
pub struct VectaraStore {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl VectaraStore {
    pub fn new(config: &VectorConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn corpus_url(&self, corpus_key: &str, suffix: &str) -> String {
        format!("{}/corpora/{corpus_key}/{suffix}", self.base_url)
    }
}

#[async_trait]
impl VectorStore for VectaraStore {
    #[tracing::instrument(skip(self, metadata, parts), fields(part_count = parts.len()))]
    async fn add_document(
        &self,
        corpus_key: &str,
        title: &str,
        metadata: serde_json::Value,
        parts: &[String],
    ) -> Result<(), VectorStoreError> {
        let mut metadata = metadata;
        if let Some(object) = metadata.as_object_mut() {
            object
                .entry("title")
                .or_insert_with(|| serde_json::Value::String(title.to_string()));
            object
                .entry("lang")
                .or_insert_with(|| serde_json::Value::String("eng".to_string()));
        }
        let body = CreateDocumentRequest {
            id: Uuid::new_v4().to_string(),
            kind: "core",
            metadata,
            document_parts: parts
                .iter()
                .map(|text| DocumentPart { text: text.clone() })
                .collect(),
        };

        let response = self
            .client
            .post(self.corpus_url(corpus_key, "documents"))
            .header("x-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::Request(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn query(
        &self,
        corpus_key: &str,
        query: &str,
        limit: usize,
        rerank: bool,
    ) -> Result<Vec<RankedPassage>, VectorStoreError> {
        let request = if rerank {
            // Give the reranker a wider candidate set to reorder.
            let body = QueryRequest {
                query: query.to_string(),
                search: SearchSpec {
                    limit: limit * 2,
                    reranker: Some(RerankerSpec {
                        kind: "customer_reranker",
                        reranker_name: RERANKER_NAME,
                    }),
                },
            };
            self.client
                .post(self.corpus_url(corpus_key, "query"))
                .json(&body)
        } else {
            self.client
                .get(self.corpus_url(corpus_key, "query"))
                .query(&[("query", query), ("limit", &limit.to_string())])
        };

        let response = request
            .header("x-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| VectorStoreError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Parse(format!("failed to parse response: {e}")))?;
        Ok(parsed
            .search_results
            .into_iter()
            .take(limit)
            .map(|result| RankedPassage {
                text: result.text,
                metadata: result.document_metadata,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> VectaraStore {
        let config = VectorConfig {
            base_url: server.uri(),
            ..VectorConfig::default()
        };
        VectaraStore::new(&config, SecretString::from("vector-key"))
    }

    #[tokio::test]
    async fn add_document_posts_parts_with_title_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/corpora/herald_news/documents"))
            .and(header("x-api-key", "vector-key"))
            .and(body_partial_json(json!({
                "type": "core",
                "metadata": {"title": "Mars briefing", "lang": "eng", "url": "http://a"},
                "document_parts": [{"text": "chunk one"}, {"text": "chunk two"}]
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .add_document(
                "herald_news",
                "Mars briefing",
                json!({"url": "http://a"}),
                &["chunk one".to_string(), "chunk two".to_string()],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reranked_query_fetches_double_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/corpora/herald_news/query"))
            .and(body_partial_json(json!({
                "query": "mars: moons",
                "search": {
                    "limit": 4,
                    "reranker": {"type": "customer_reranker", "reranker_name": "Rerank_Multilingual_v1"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_results": [
                    {"text": "p1", "document_metadata": {"title": "A"}},
                    {"text": "p2", "document_metadata": {"title": "B"}},
                    {"text": "p3", "document_metadata": {"title": "C"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let passages = store(&server)
            .query("herald_news", "mars: moons", 2, true)
            .await
            .unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, "p1");
        assert_eq!(passages[0].metadata["title"], "A");
    }

    #[tokio::test]
    async fn plain_query_is_a_get_with_the_requested_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/corpora/herald_episodic/query"))
            .and(query_param("query", "anything"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let passages = store(&server)
            .query("herald_episodic", "anything", 3, false)
            .await
            .unwrap();
        assert!(passages.is_empty());
    }

    #[tokio::test]
    async fn http_error_surfaces_as_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let err = store(&server)
            .add_document("c", "t", json!({}), &["p".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::Request(_)));
    }
}
