//! Text-generation port and structured-output helper.
//!
//! `TextGenerator` is the single abstraction every LLM-backed step goes
//! through. Implementations live in herald-infra. The trait is object-safe so
//! processors can share one provider behind `Arc<dyn TextGenerator>`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use herald_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Port for text-generation collaborators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g., "openai_compat").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Run a completion and parse its output as a JSON value of type `T`.
///
/// Providers in JSON mode still occasionally wrap the object in a markdown
/// code fence; the fence is stripped before parsing. A response that does not
/// parse as `T` is [`LlmError::Deserialization`] -- the hard-failure class
/// that synchronous callers surface instead of falling back.
pub async fn complete_json<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    request: &CompletionRequest,
) -> Result<T, LlmError> {
    let response = generator.complete(request).await?;
    let raw = strip_code_fence(&response.content);
    serde_json::from_str(raw).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        LlmError::Deserialization(format!("{e} (content preview: {preview:?})"))
    })
}

/// Remove a surrounding markdown code fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
