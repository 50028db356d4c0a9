//! Video-generation processor.
//!
//! Two-stage pipeline: generate a still frame, submit it with a motion
//! prompt to the video collaborator, then poll the task until it reaches a
//! terminal state. Both prompts are extracted synchronously from the
//! dialogue; the frame prompt is framed with the classified topic the same
//! way image requests are.

use std::sync::Arc;
use std::time::Duration;

use herald_types::error::{JobError, MediaError, TurnError};
use herald_types::intent::TopicSpec;
use herald_types::job::{JobRequest, VideoJob};
use herald_types::llm::CompletionRequest;
use herald_types::media::{VideoParams, VideoTaskStatus};

use crate::llm::{TextGenerator, complete_json};
use crate::media::{ImageGenerator, VideoGenerator};
use crate::notify::NotificationChannel;
use crate::processor::acknowledge;
use crate::processor::image::frame_prompt;
use crate::queue::{FailureHandler, JobQueue};

const EXTRACT_MAX_TOKENS: u32 = 192;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

const EXTRACT_PROMPT: &str = r#"The user wants a short video. Write two prompts: one for an
image-generation model describing the opening frame, and one describing the
camera and subject motion from that frame. Use null for anything the dialogue
does not describe.

Dialogue:
${input}

Respond with a single JSON object:
{"image_gen_prompt": "<frame prompt or null>", "video_gen_prompt": "<motion prompt or null>"}
"#;

struct VideoWorker {
    image: Arc<dyn ImageGenerator>,
    video: Arc<dyn VideoGenerator>,
    notifier: Arc<dyn NotificationChannel>,
}

impl VideoWorker {
    #[tracing::instrument(skip_all)]
    async fn run(&self, job: VideoJob) -> Result<(), JobError> {
        let frame_prompt = job
            .params
            .image_gen_prompt
            .ok_or_else(|| JobError::InvalidPayload("no frame prompt".to_string()))?;
        let motion_prompt = job
            .params
            .video_gen_prompt
            .ok_or_else(|| JobError::InvalidPayload("no motion prompt".to_string()))?;

        let image_url = self.image.generate(&frame_prompt).await?;
        let task_id = self.video.submit(&image_url, &motion_prompt).await?;
        tracing::debug!(%task_id, "video task submitted, polling");

        loop {
            match self.video.poll(&task_id).await? {
                VideoTaskStatus::Succeeded { output_url } => {
                    self.notifier.send(&output_url).await?;
                    return Ok(());
                }
                VideoTaskStatus::Failed => {
                    return Err(MediaError::Generation(format!(
                        "video task {task_id} failed"
                    ))
                    .into());
                }
                VideoTaskStatus::Pending | VideoTaskStatus::Running => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}

/// Turn-path handle for video requests.
pub struct VideoProcessor {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    notification_model: String,
    queue: JobQueue<VideoJob>,
}

impl VideoProcessor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        notification_model: impl Into<String>,
        image: Arc<dyn ImageGenerator>,
        video: Arc<dyn VideoGenerator>,
        notifier: Arc<dyn NotificationChannel>,
        failure: Arc<dyn FailureHandler>,
    ) -> Self {
        let worker = Arc::new(VideoWorker {
            image,
            video,
            notifier,
        });
        let queue = JobQueue::spawn("video", failure, move |job: JobRequest<VideoJob>| {
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
        let extracted: VideoParams = complete_json(self.generator.as_ref(), &request).await?;

        let body = extracted
            .image_gen_prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| last_user_message.to_string());
        let rendered = frame_prompt(topic, &body);

        self.queue.submit(JobRequest::new(VideoJob {
            params: VideoParams {
                image_gen_prompt: Some(rendered),
                video_gen_prompt: extracted.video_gen_prompt,
            },
        }))?;
        let ack = acknowledge(
            self.generator.as_ref(),
            &self.notification_model,
            "create a video",
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
