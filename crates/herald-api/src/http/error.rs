//! Mapping from turn failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use herald_types::error::TurnError;
use herald_types::llm::LlmError;

/// Application-level error that maps to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    Turn(TurnError),
    Validation(String),
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        AppError::Turn(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Turn(TurnError::Llm(LlmError::Deserialization(msg))) => (
                StatusCode::BAD_GATEWAY,
                "CLASSIFICATION_FAILED",
                msg.clone(),
            ),
            AppError::Turn(TurnError::Llm(LlmError::RateLimited)) => (
                StatusCode::TOO_MANY_REQUESTS,
                "UPSTREAM_RATE_LIMITED",
                "the language model is rate limiting requests".to_string(),
            ),
            AppError::Turn(TurnError::Llm(e)) => {
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", e.to_string())
            }
            AppError::Turn(TurnError::Media(e)) => {
                (StatusCode::BAD_GATEWAY, "MEDIA_ERROR", e.to_string())
            }
            AppError::Turn(TurnError::QueueClosed(name)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SHUTTING_DOWN",
                format!("the {name} processor is no longer accepting work"),
            ),
        };

        tracing::warn!(code, %message, "turn request failed");
        let body = Json(json!({
            "error": { "code": code, "message": message }
        }));
        (status, body).into_response()
    }
}
