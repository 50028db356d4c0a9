//! Shared test doubles for the pipeline's ports.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use herald_types::document::RankedPassage;
use herald_types::error::{NotifyError, VectorStoreError};
use herald_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use crate::llm::TextGenerator;
use crate::notify::NotificationChannel;
use crate::vector::VectorStore;

/// A `TextGenerator` that replays scripted responses in order and records
/// every request it sees.
pub(crate) struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in call order.
    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(content) => Ok(CompletionResponse {
                content,
                model: request.model.clone(),
            }),
            None => Err(LlmError::Provider {
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// One recorded `add_document` call.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub corpus_key: String,
    pub title: String,
    pub metadata: serde_json::Value,
    pub parts: Vec<String>,
}

/// A `VectorStore` that records writes and replays scripted query results.
#[derive(Default)]
pub(crate) struct RecordingStore {
    documents: Mutex<Vec<StoredDocument>>,
    query_results: Mutex<VecDeque<Vec<RankedPassage>>>,
    queries: Mutex<Vec<(String, String, usize, bool)>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_query_results(
        results: impl IntoIterator<Item = Vec<RankedPassage>>,
    ) -> Self {
        Self {
            query_results: Mutex::new(results.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn documents(&self) -> Vec<StoredDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub(crate) fn queries(&self) -> Vec<(String, String, usize, bool)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn add_document(
        &self,
        corpus_key: &str,
        title: &str,
        metadata: serde_json::Value,
        parts: &[String],
    ) -> Result<(), VectorStoreError> {
        self.documents.lock().unwrap().push(StoredDocument {
            corpus_key: corpus_key.to_string(),
            title: title.to_string(),
            metadata,
            parts: parts.to_vec(),
        });
        Ok(())
    }

    async fn query(
        &self,
        corpus_key: &str,
        query: &str,
        limit: usize,
        rerank: bool,
    ) -> Result<Vec<RankedPassage>, VectorStoreError> {
        self.queries.lock().unwrap().push((
            corpus_key.to_string(),
            query.to_string(),
            limit,
            rerank,
        ));
        Ok(self
            .query_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// A `NotificationChannel` that records everything sent through it.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
