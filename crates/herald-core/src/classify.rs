//! Intent classification for inbound user turns.
//!
//! Each turn, the full dialogue window is handed to the interaction model
//! with a deterministic prompt (temperature zero, JSON mode) and the response
//! is parsed into a [`ClassifiedIntent`]. A response that fails to parse is a
//! hard failure for the turn; the dispatcher does not fall back to casual
//! conversation on garbage output.

use std::sync::Arc;

use herald_types::intent::ClassifiedIntent;
use herald_types::llm::{CompletionRequest, LlmError};

use crate::llm::{TextGenerator, complete_json};

const CLASSIFY_MAX_TOKENS: u32 = 300;

const CLASSIFY_PROMPT: &str = r#"You are an intent classifier for a conversational content assistant.
Read the dialogue below and decide which single intent the latest user
message expresses. The possible intents are:

- casual_conversation: small talk, questions, or anything not covered below.
- article_writing: the user asks for a long-form article or write-up.
- compose_social_media: the user asks for a social media post.
- create_meme: the user asks for a meme.
- generate_image: the user asks for a picture or illustration.
- create_video: the user asks for a video or animation.
- episodic_memory_event: the user shares a noteworthy personal event or fact
  about themselves worth remembering, without requesting any content.

When the intent involves content creation, also extract the topic details.
Use "not_specified" for any detail the dialogue does not establish, and an
empty list when no subtopics are named. Do not invent details.

Respond with a single JSON object and nothing else, in this shape:

{
  "intent": "<one of the intents above>",
  "topic": {
    "main_topic": "<main subject>",
    "subtopics": ["<subtopic>", "..."],
    "target_audience": "<audience>",
    "tone": "<tone>",
    "complexity": "<complexity>",
    "context": "<one-sentence summary of what was asked>"
  }
}

Examples:

Dialogue: "hey, how was your weekend?"
Output: {"intent": "casual_conversation", "topic": {"main_topic": "not_specified", "subtopics": [], "target_audience": "not_specified", "tone": "not_specified", "complexity": "not_specified", "context": "not_specified"}}

Dialogue: "write an article about why stars look different colors, for kids"
Output: {"intent": "article_writing", "topic": {"main_topic": "star colors", "subtopics": ["stellar temperature"], "target_audience": "children", "tone": "friendly", "complexity": "simplified", "context": "why stars appear in different colors"}}

Dialogue:
${input}
"#;

/// Classifies a dialogue window into one of the supported intents.
pub struct IntentClassifier {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl IntentClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Classify the latest turn given the recent dialogue window.
    #[tracing::instrument(skip_all)]
    pub async fn classify(&self, window: &str) -> Result<ClassifiedIntent, LlmError> {
        let prompt = CLASSIFY_PROMPT.replace("${input}", window);
        let mut request = CompletionRequest::from_prompt(&self.model, prompt, CLASSIFY_MAX_TOKENS);
        request.temperature = Some(0.0);
        request.frequency_penalty = Some(1.1);
        request.json_mode = true;

        let classified: ClassifiedIntent = complete_json(self.generator.as_ref(), &request).await?;
        tracing::debug!(intent = %classified.intent, "classified turn");
        Ok(classified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;
    use herald_types::intent::{Intent, NOT_SPECIFIED};

    #[tokio::test]
    async fn classify_parses_full_response() {
        let generator = Arc::new(ScriptedGenerator::new([r#"{
            "intent": "article_writing",
            "topic": {
                "main_topic": "star colors",
                "subtopics": ["stellar temperature"],
                "target_audience": "children",
                "tone": "friendly",
                "complexity": "simplified",
                "context": "why stars appear in different colors"
            }
        }"#]));
        let classifier = IntentClassifier::new(generator.clone(), "interaction-model");

        let classified = classifier.classify("write me an article").await.unwrap();
        assert_eq!(classified.intent, Intent::ArticleWriting);
        assert_eq!(classified.topic.main_topic, "star colors");

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "interaction-model");
        assert_eq!(requests[0].max_tokens, 300);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(requests[0].json_mode);
        assert!(requests[0].messages[0].content.contains("write me an article"));
    }

    #[tokio::test]
    async fn classify_defaults_missing_topic_fields() {
        let generator = Arc::new(ScriptedGenerator::new([
            r#"{"intent": "casual_conversation"}"#,
        ]));
        let classifier = IntentClassifier::new(generator, "m");
        let classified = classifier.classify("hello there").await.unwrap();
        assert_eq!(classified.intent, Intent::CasualConversation);
        assert_eq!(classified.topic.main_topic, NOT_SPECIFIED);
    }

    #[tokio::test]
    async fn classify_surfaces_malformed_output() {
        let generator = Arc::new(ScriptedGenerator::new(["definitely not json"]));
        let classifier = IntentClassifier::new(generator, "m");
        let result = classifier.classify("hello").await;
        assert!(matches!(result, Err(LlmError::Deserialization(_))));
    }

    #[tokio::test]
    async fn classify_rejects_unknown_intent() {
        let generator = Arc::new(ScriptedGenerator::new([r#"{"intent": "write_a_novel"}"#]));
        let classifier = IntentClassifier::new(generator, "m");
        let result = classifier.classify("hello").await;
        assert!(matches!(result, Err(LlmError::Deserialization(_))));
    }
}
