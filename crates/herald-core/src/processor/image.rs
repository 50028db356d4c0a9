//! Image-generation processor.
//!
//! The rendering prompt is derived synchronously from the dialogue, framed
//! with the classified topic, and carried in the job payload; the worker only
//! calls the image collaborator and delivers the URL.

use std::sync::Arc;

use herald_types::error::{JobError, TurnError};
use herald_types::intent::{NOT_SPECIFIED, TopicSpec};
use herald_types::job::{ImageJob, JobRequest};
use herald_types::llm::CompletionRequest;
use herald_types::media::ImageParams;

use crate::llm::{TextGenerator, complete_json};
use crate::media::ImageGenerator;
use crate::notify::NotificationChannel;
use crate::processor::acknowledge;
use crate::queue::{FailureHandler, JobQueue};

const EXTRACT_MAX_TOKENS: u32 = 192;

const EXTRACT_PROMPT: &str = r#"The user wants an image. Write a single, concrete prompt for an
image-generation model that captures exactly what they described: subject,
setting, style, mood. Do not add elements the user did not ask for. Use null
if the dialogue does not describe an image at all.

Dialogue:
${input}

Respond with a single JSON object:
{"image_gen_prompt": "<prompt or null>"}
"#;

struct ImageWorker {
    image: Arc<dyn ImageGenerator>,
    notifier: Arc<dyn NotificationChannel>,
}

impl ImageWorker {
    #[tracing::instrument(skip_all)]
    async fn run(&self, job: ImageJob) -> Result<(), JobError> {
        let prompt = job
            .params
            .image_gen_prompt
            .ok_or_else(|| JobError::InvalidPayload("no image prompt".to_string()))?;
        let url = self.image.generate(&prompt).await?;
        self.notifier.send(&url).await?;
        Ok(())
    }
}

/// Turn-path handle for image requests.
pub struct ImageProcessor {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    notification_model: String,
    queue: JobQueue<ImageJob>,
}

impl ImageProcessor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        notification_model: impl Into<String>,
        image: Arc<dyn ImageGenerator>,
        notifier: Arc<dyn NotificationChannel>,
        failure: Arc<dyn FailureHandler>,
    ) -> Self {
        let worker = Arc::new(ImageWorker { image, notifier });
        let queue = JobQueue::spawn("image", failure, move |job: JobRequest<ImageJob>| {
            let worker = worker.clone();
            async move { worker.run(job.payload).await }
        });
        Self {
            generator,
            interaction_model: interaction_model.into(),
            notification_model: notification_model.into(),
            queue,
        }
    }

    pub async fn handle_content_request(
        &self,
        window: &str,
        topic: &TopicSpec,
        last_user_message: &str,
    ) -> Result<String, TurnError> {
        let prompt = EXTRACT_PROMPT.replace("${input}", window);
        let mut request =
            CompletionRequest::from_prompt(&self.interaction_model, prompt, EXTRACT_MAX_TOKENS);
        request.temperature = Some(0.08);
        request.json_mode = true;
        let extracted: ImageParams = complete_json(self.generator.as_ref(), &request).await?;

        let body = extracted
            .image_gen_prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| last_user_message.to_string());
        let rendered = frame_prompt(topic, &body);

        self.queue.submit(JobRequest::new(ImageJob {
            params: ImageParams {
                image_gen_prompt: Some(rendered),
            },
        }))?;
        let ack = acknowledge(
            self.generator.as_ref(),
            &self.notification_model,
            "generate an image",
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

/// Frame the rendering prompt with the classified topic, when there is one.
pub(crate) fn frame_prompt(topic: &TopicSpec, body: &str) -> String {
    if topic.main_topic == NOT_SPECIFIED {
        return body.to_string();
    }
    format!("**{}: {}**\n\n{}", topic.main_topic, topic.context, body)
}
