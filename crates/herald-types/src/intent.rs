//! Intent classification types.
//!
//! One [`ClassifiedIntent`] is produced per inbound user turn by the intent
//! classifier and consumed by the dispatcher. It is an immutable value and is
//! never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel for topic fields the classifier did not fill in.
pub const NOT_SPECIFIED: &str = "not_specified";

fn not_specified() -> String {
    NOT_SPECIFIED.to_string()
}

/// The seven mutually exclusive user intents the classifier can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CasualConversation,
    ArticleWriting,
    ComposeSocialMedia,
    CreateMeme,
    GenerateImage,
    CreateVideo,
    EpisodicMemoryEvent,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::CasualConversation => write!(f, "casual_conversation"),
            Intent::ArticleWriting => write!(f, "article_writing"),
            Intent::ComposeSocialMedia => write!(f, "compose_social_media"),
            Intent::CreateMeme => write!(f, "create_meme"),
            Intent::GenerateImage => write!(f, "generate_image"),
            Intent::CreateVideo => write!(f, "create_video"),
            Intent::EpisodicMemoryEvent => write!(f, "episodic_memory_event"),
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "casual_conversation" => Ok(Intent::CasualConversation),
            "article_writing" => Ok(Intent::ArticleWriting),
            "compose_social_media" => Ok(Intent::ComposeSocialMedia),
            "create_meme" => Ok(Intent::CreateMeme),
            "generate_image" => Ok(Intent::GenerateImage),
            "create_video" => Ok(Intent::CreateVideo),
            "episodic_memory_event" => Ok(Intent::EpisodicMemoryEvent),
            other => Err(format!("invalid intent: '{other}'")),
        }
    }
}

/// Topic details extracted alongside the intent.
///
/// The classifier is allowed to return a subset of fields; anything absent
/// deserializes to the `"not_specified"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    #[serde(default = "not_specified")]
    pub main_topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default = "not_specified")]
    pub target_audience: String,
    #[serde(default = "not_specified")]
    pub tone: String,
    #[serde(default = "not_specified")]
    pub complexity: String,
    #[serde(default = "not_specified")]
    pub context: String,
}

impl Default for TopicSpec {
    fn default() -> Self {
        Self {
            main_topic: not_specified(),
            subtopics: Vec::new(),
            target_audience: not_specified(),
            tone: not_specified(),
            complexity: not_specified(),
            context: not_specified(),
        }
    }
}

/// The classifier's judgment for one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub intent: Intent,
    #[serde(default)]
    pub topic: TopicSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_roundtrip() {
        for intent in [
            Intent::CasualConversation,
            Intent::ArticleWriting,
            Intent::ComposeSocialMedia,
            Intent::CreateMeme,
            Intent::GenerateImage,
            Intent::CreateVideo,
            Intent::EpisodicMemoryEvent,
        ] {
            let s = intent.to_string();
            let parsed: Intent = s.parse().unwrap();
            assert_eq!(intent, parsed);
        }
    }

    #[test]
    fn test_intent_serde() {
        let json = serde_json::to_string(&Intent::CreateMeme).unwrap();
        assert_eq!(json, "\"create_meme\"");
        let parsed: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Intent::CreateMeme);
    }

    #[test]
    fn test_unknown_intent_is_a_parse_error() {
        let result = serde_json::from_str::<Intent>("\"write_a_novel\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_topic_fields_default_to_not_specified() {
        let json = r#"{"main_topic": "space exploration"}"#;
        let topic: TopicSpec = serde_json::from_str(json).unwrap();
        assert_eq!(topic.main_topic, "space exploration");
        assert_eq!(topic.target_audience, NOT_SPECIFIED);
        assert_eq!(topic.tone, NOT_SPECIFIED);
        assert_eq!(topic.complexity, NOT_SPECIFIED);
        assert_eq!(topic.context, NOT_SPECIFIED);
        assert!(topic.subtopics.is_empty());
    }

    #[test]
    fn test_classified_intent_without_topic() {
        let json = r#"{"intent": "casual_conversation"}"#;
        let classified: ClassifiedIntent = serde_json::from_str(json).unwrap();
        assert_eq!(classified.intent, Intent::CasualConversation);
        assert_eq!(classified.topic, TopicSpec::default());
    }

    #[test]
    fn test_classified_intent_full() {
        let json = r#"{
            "intent": "article_writing",
            "topic": {
                "main_topic": "space exploration",
                "subtopics": ["stellar distance", "star colors"],
                "target_audience": "children",
                "tone": "friendly",
                "complexity": "simplified",
                "context": "star distance and observed colors"
            }
        }"#;
        let classified: ClassifiedIntent = serde_json::from_str(json).unwrap();
        assert_eq!(classified.intent, Intent::ArticleWriting);
        assert_eq!(classified.topic.subtopics.len(), 2);
        assert_eq!(classified.topic.target_audience, "children");
    }
}
