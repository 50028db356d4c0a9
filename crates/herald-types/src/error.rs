//! Error taxonomy for the pipeline.
//!
//! Propagation policy: the synchronous ack path (classification, parameter
//! extraction, ack generation) surfaces [`TurnError`] to the caller; the
//! asynchronous worker path catches [`JobError`] at the worker boundary,
//! hands it to the failure sink, and drops the job. Per-URL retrieval
//! failures ([`FetchError`]) are recovered locally by exclusion and never
//! propagate at all.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced to the caller of a conversational turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),

    /// A media collaborator failed during ack-path parameter derivation
    /// (e.g. listing caption templates before extraction).
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("processor queue is closed: {0}")]
    QueueClosed(String),
}

/// Errors from the search-provider collaborator.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search response did not parse: {0}")]
    Parse(String),
}

/// Per-URL fetch failures. Recovered locally by excluding the URL from the
/// result set.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("no extractable content")]
    EmptyContent,
}

/// Errors from the vector-store collaborator.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store response did not parse: {0}")]
    Parse(String),
}

/// Errors from the notification collaborator.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Errors from the image/video/caption collaborators.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media request failed: {0}")]
    Request(String),

    #[error("media response did not parse: {0}")]
    Parse(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("no matching template for '{0}'")]
    TemplateNotFound(String),
}

/// Any failure inside a background worker's pipeline after a job has been
/// accepted. Caught at the worker boundary; terminal for that one job only.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("invalid job payload: {0}")]
    InvalidPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_wraps_llm_error() {
        let err: JobError = LlmError::RateLimited.into();
        assert!(matches!(err, JobError::Llm(_)));
    }

    #[test]
    fn test_turn_error_display() {
        let err = TurnError::Llm(LlmError::Deserialization("bad json".to_string()));
        assert!(err.to_string().contains("bad json"));
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(503).to_string(), "unexpected status 503");
        assert_eq!(FetchError::Timeout.to_string(), "timed out");
    }
}
