//! Episodic-memory processor.
//!
//! Detection runs on the turn path against the user-authored turns only;
//! assistant turns never contribute events. When a qualifying event is found
//! it is queued for storage and the dispatcher carries on with a normal
//! conversational reply, so the user never sees the bookkeeping.

use std::sync::Arc;

use serde_json::json;

use herald_types::error::{JobError, TurnError};
use herald_types::job::{EpisodicJob, JobRequest};
use herald_types::llm::{CompletionRequest, Message, MessageRole};
use herald_types::media::{EpisodicFinding, NO_EPISODIC_EVENT};

use crate::llm::TextGenerator;
use crate::queue::{FailureHandler, JobQueue};
use crate::vector::VectorStore;

/// Corpus receiving autobiographical events.
pub const EPISODIC_CORPUS_KEY: &str = "herald_episodic";

const DETECT_MAX_TOKENS: u32 = 1024;

const DETECT_PROMPT: &str = r#"Below are a user's own messages from a conversation, as JSON. Decide
whether they share a noteworthy personal event or fact about themselves:
something that happened to them, a milestone, a preference, a relationship.
Questions and content requests do not count.

If there is such an event, restate it as one standalone past-tense sentence
about the user. If there is none, output exactly NOEPISODICEVENT and nothing
else.

Messages:
${input}
"#;

struct EpisodicWorker {
    store: Arc<dyn VectorStore>,
}

impl EpisodicWorker {
    #[tracing::instrument(skip_all)]
    async fn run(&self, job: EpisodicJob) -> Result<(), JobError> {
        self.store
            .add_document(
                EPISODIC_CORPUS_KEY,
                &job.fact,
                json!({ "source": "dialogue" }),
                &[job.fact.clone()],
            )
            .await?;
        Ok(())
    }
}

/// Turn-path handle for episodic-event detection.
pub struct EpisodicProcessor {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    queue: JobQueue<EpisodicJob>,
}

impl EpisodicProcessor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        store: Arc<dyn VectorStore>,
        failure: Arc<dyn FailureHandler>,
    ) -> Self {
        let worker = Arc::new(EpisodicWorker { store });
        let queue = JobQueue::spawn("episodic", failure, move |job: JobRequest<EpisodicJob>| {
            let worker = worker.clone();
            async move { worker.run(job.payload).await }
        });
        Self {
            generator,
            interaction_model: interaction_model.into(),
            queue,
        }
    }

    /// Detect an autobiographical event in the user's turns and queue it for
    /// storage. Produces no reply of its own.
    pub async fn handle_content_request(&self, history: &[Message]) -> Result<(), TurnError> {
        let user_turns: Vec<&str> = history
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect();
        if user_turns.is_empty() {
            return Ok(());
        }
        let serialized = serde_json::to_string_pretty(&user_turns)
            .unwrap_or_else(|_| user_turns.join("\n"));

        let prompt = DETECT_PROMPT.replace("${input}", &serialized);
        let mut request =
            CompletionRequest::from_prompt(&self.interaction_model, prompt, DETECT_MAX_TOKENS);
        request.temperature = Some(0.08);
        let response = self.generator.complete(&request).await?;

        let finding = EpisodicFinding {
            fact: response.content.trim().to_string(),
        };
        if !finding.is_event() || finding.fact.contains(NO_EPISODIC_EVENT) {
            tracing::debug!("no episodic event in this window");
            return Ok(());
        }

        tracing::debug!(fact = %finding.fact, "queueing episodic event");
        self.queue.submit(JobRequest::new(EpisodicJob {
            fact: finding.fact,
        }))?;
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.queue.close();
        self.queue.join().await;
    }
}
