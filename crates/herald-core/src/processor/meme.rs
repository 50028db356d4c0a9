//! Meme processor.
//!
//! Parameter extraction is synchronous because it needs both the live
//! dialogue and the caption service's current template list; only the render
//! and delivery run on the queue. An unknown template name fails the job, it
//! does not fall back to a different template.

use std::sync::Arc;

use herald_types::error::{JobError, MediaError, TurnError};
use herald_types::job::{JobRequest, MemeJob};
use herald_types::llm::CompletionRequest;
use herald_types::media::MemeParams;

use crate::llm::{TextGenerator, complete_json};
use crate::media::CaptionService;
use crate::notify::NotificationChannel;
use crate::processor::acknowledge;
use crate::queue::{FailureHandler, JobQueue};

const EXTRACT_MAX_TOKENS: u32 = 100;

const EXTRACT_PROMPT: &str = r#"The user wants a meme. Pick the template that best fits their request
from this list, and write the two caption texts. Use the template names
exactly as listed. Use null for anything you cannot determine.

Templates:
${templates}

Message: ${input}

Respond with a single JSON object:
{"meme_name": "<template name or null>", "top_text": "<text or null>", "bottom_text": "<text or null>"}
"#;

struct MemeWorker {
    caption: Arc<dyn CaptionService>,
    notifier: Arc<dyn NotificationChannel>,
}

impl MemeWorker {
    #[tracing::instrument(skip_all)]
    async fn run(&self, job: MemeJob) -> Result<(), JobError> {
        let meme_name = job
            .params
            .meme_name
            .ok_or_else(|| JobError::InvalidPayload("no meme template name".to_string()))?;
        let template = self
            .caption
            .find_template(&meme_name)
            .await?
            .ok_or(MediaError::TemplateNotFound(meme_name))?;
        tracing::debug!(template = %template.name, "rendering meme");
        let url = self
            .caption
            .render(
                &template.id,
                job.params.top_text.as_deref().unwrap_or_default(),
                job.params.bottom_text.as_deref().unwrap_or_default(),
            )
            .await?;
        self.notifier.send(&url).await?;
        Ok(())
    }
}

/// Turn-path handle for meme requests.
pub struct MemeProcessor {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    notification_model: String,
    caption: Arc<dyn CaptionService>,
    queue: JobQueue<MemeJob>,
}

impl MemeProcessor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        notification_model: impl Into<String>,
        caption: Arc<dyn CaptionService>,
        notifier: Arc<dyn NotificationChannel>,
        failure: Arc<dyn FailureHandler>,
    ) -> Self {
        let worker = Arc::new(MemeWorker {
            caption: caption.clone(),
            notifier,
        });
        let queue = JobQueue::spawn("meme", failure, move |job: JobRequest<MemeJob>| {
            let worker = worker.clone();
            async move { worker.run(job.payload).await }
        });
        Self {
            generator,
            interaction_model: interaction_model.into(),
            notification_model: notification_model.into(),
            caption,
            queue,
        }
    }

    /// Extract meme parameters from the dialogue, enqueue the render, and
    /// return the immediate acknowledgment.
    pub async fn handle_content_request(
        &self,
        window: &str,
        last_user_message: &str,
    ) -> Result<String, TurnError> {
        let templates = self.caption.list_two_box_templates().await?;
        let prompt = EXTRACT_PROMPT
            .replace("${templates}", &templates.join("\n"))
            .replace("${input}", last_user_message);
        let mut request =
            CompletionRequest::from_prompt(&self.interaction_model, prompt, EXTRACT_MAX_TOKENS);
        request.temperature = Some(0.0);
        request.json_mode = true;
        let params: MemeParams = complete_json(self.generator.as_ref(), &request).await?;

        self.queue.submit(JobRequest::new(MemeJob { params }))?;
        let ack = acknowledge(
            self.generator.as_ref(),
            &self.notification_model,
            "make a meme",
            window,
        )
        .await?;
        Ok(ack)
    }

    pub async fn shutdown(&self) {
        self.queue.close();
        self.queue.join().await;
    }
}
