//! The turn endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use herald_types::llm::{Message, MessageRole};

use crate::http::error::AppError;
use crate::state::AppState;

/// One conversational turn: the dialogue so far, newest message last.
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub messages: Vec<TurnMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TurnMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub reply: String,
}

/// `POST /api/v1/turn`
pub async fn submit_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation("messages must not be empty".to_string()));
    }

    let mut history = Vec::with_capacity(request.messages.len());
    for message in request.messages {
        let role: MessageRole = message
            .role
            .parse()
            .map_err(AppError::Validation)?;
        history.push(Message {
            role,
            content: message.content,
        });
    }

    let reply = state.dispatcher.submit_turn(&history).await?;
    Ok(Json(TurnResponse { reply }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_from_role_strings() {
        let request: TurnRequest = serde_json::from_str(
            r#"{"messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "write an article about owls"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "write an article about owls");
        let role: MessageRole = request.messages[1].role.parse().unwrap();
        assert_eq!(role, MessageRole::Assistant);
    }

    #[test]
    fn test_unknown_role_fails_to_parse() {
        let result = "moderator".parse::<MessageRole>();
        assert!(result.is_err());
    }
}
