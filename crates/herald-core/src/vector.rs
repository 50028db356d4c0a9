//! Vector-store port.
//!
//! The store is external and owns its own concurrency control; the pipeline
//! only ever adds whole documents and runs ranked queries. Corpus keys are
//! plain strings owned by the callers (news, semantic, episodic).

use async_trait::async_trait;

use herald_types::document::RankedPassage;
use herald_types::error::VectorStoreError;

/// Port for the external vector store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add one document (title + metadata + ordered text parts) to a corpus.
    async fn add_document(
        &self,
        corpus_key: &str,
        title: &str,
        metadata: serde_json::Value,
        parts: &[String],
    ) -> Result<(), VectorStoreError>;

    /// Query a corpus. With `rerank` the store fetches a larger candidate
    /// set and reorders it before truncating to `limit`.
    async fn query(
        &self,
        corpus_key: &str,
        query: &str,
        limit: usize,
        rerank: bool,
    ) -> Result<Vec<RankedPassage>, VectorStoreError>;
}
