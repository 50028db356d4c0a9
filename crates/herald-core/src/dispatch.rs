//! Turn dispatching.
//!
//! One inbound user turn flows through here: classify the recent dialogue
//! window, route to the matching processor's turn path, and return the reply
//! synchronously. Content intents answer with an acknowledgment while the
//! real work runs on the processor queues; casual conversation (and the
//! reply after an episodic detection) comes straight from the interaction
//! model.

use std::sync::Arc;

use herald_types::error::TurnError;
use herald_types::intent::Intent;
use herald_types::llm::{CompletionRequest, Message, MessageRole};

use crate::classify::IntentClassifier;
use crate::llm::TextGenerator;
use crate::processor::article::ArticleProcessor;
use crate::processor::episodic::EpisodicProcessor;
use crate::processor::image::ImageProcessor;
use crate::processor::meme::MemeProcessor;
use crate::processor::social::SocialPostProcessor;
use crate::processor::video::VideoProcessor;

/// How many trailing messages form the classification window.
pub const DIALOGUE_WINDOW_TURNS: usize = 6;

const CONVERSE_MAX_TOKENS: u32 = 1024;

const CONVERSE_SYSTEM: &str = "You are Herald, a warm and capable assistant. Reply naturally and \
briefly, in the register of the conversation. Never mention queues, jobs, or \
internal machinery.";

/// The six processors the dispatcher routes to.
pub struct Processors {
    pub article: ArticleProcessor,
    pub social: SocialPostProcessor,
    pub meme: MemeProcessor,
    pub image: ImageProcessor,
    pub video: VideoProcessor,
    pub episodic: EpisodicProcessor,
}

/// Entry point for conversational turns.
pub struct Dispatcher {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    classifier: IntentClassifier,
    processors: Processors,
}

impl Dispatcher {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        processors: Processors,
    ) -> Self {
        let interaction_model = interaction_model.into();
        let classifier = IntentClassifier::new(generator.clone(), interaction_model.clone());
        Self {
            generator,
            interaction_model,
            classifier,
            processors,
        }
    }

    /// Handle one user turn and return the reply. `history` ends with the
    /// newest user message.
    #[tracing::instrument(skip_all, fields(history_len = history.len()))]
    pub async fn submit_turn(&self, history: &[Message]) -> Result<String, TurnError> {
        let window = dialogue_window(history);
        let classified = self.classifier.classify(&window).await?;
        tracing::info!(intent = %classified.intent, "routing turn");

        let last_user_message = history
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        match classified.intent {
            Intent::CasualConversation => self.converse(history).await,
            Intent::ArticleWriting => {
                self.processors
                    .article
                    .handle_content_request(&window, &classified.topic, last_user_message)
                    .await
            }
            Intent::ComposeSocialMedia => {
                self.processors
                    .social
                    .handle_content_request(&window, &classified.topic, last_user_message)
                    .await
            }
            Intent::CreateMeme => {
                self.processors
                    .meme
                    .handle_content_request(&window, last_user_message)
                    .await
            }
            Intent::GenerateImage => {
                self.processors
                    .image
                    .handle_content_request(&window, &classified.topic, last_user_message)
                    .await
            }
            Intent::CreateVideo => {
                self.processors
                    .video
                    .handle_content_request(&window, &classified.topic, last_user_message)
                    .await
            }
            Intent::EpisodicMemoryEvent => {
                // Remember the event, then answer as if it were small talk.
                self.processors.episodic.handle_content_request(history).await?;
                self.converse(history).await
            }
        }
    }

    async fn converse(&self, history: &[Message]) -> Result<String, TurnError> {
        let request = CompletionRequest {
            model: self.interaction_model.clone(),
            messages: history.to_vec(),
            system: Some(CONVERSE_SYSTEM.to_string()),
            max_tokens: CONVERSE_MAX_TOKENS,
            temperature: None,
            top_p: Some(0.1),
            frequency_penalty: Some(1.1),
            json_mode: false,
        };
        let response = self.generator.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }

    /// Close every processor queue and wait for queued work to drain.
    pub async fn shutdown(&self) {
        self.processors.article.shutdown().await;
        self.processors.social.shutdown().await;
        self.processors.meme.shutdown().await;
        self.processors.image.shutdown().await;
        self.processors.video.shutdown().await;
        self.processors.episodic.shutdown().await;
    }
}

/// The classification window: the last few messages, newest last.
pub fn dialogue_window(history: &[Message]) -> String {
    let start = history.len().saturating_sub(DIALOGUE_WINDOW_TURNS);
    history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
