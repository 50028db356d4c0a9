//! Media-generation ports: images, videos, and captioned meme templates.

use async_trait::async_trait;

use herald_types::error::MediaError;
use herald_types::media::{MemeTemplate, VideoTaskStatus};

/// Port for the image-generation collaborator.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image and return its URL (or provider reference).
    async fn generate(&self, prompt: &str) -> Result<String, MediaError>;
}

/// Port for the submit-then-poll video-generation collaborator.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Submit an image-to-video task; returns the provider task id.
    async fn submit(&self, image_ref: &str, motion_prompt: &str) -> Result<String, MediaError>;

    /// Check the status of a previously submitted task.
    async fn poll(&self, task_id: &str) -> Result<VideoTaskStatus, MediaError>;
}

/// Port for the meme-caption collaborator.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Names of the available two-text-box templates.
    async fn list_two_box_templates(&self) -> Result<Vec<String>, MediaError>;

    /// Look up a template by case-insensitive substring match on its name.
    async fn find_template(&self, name: &str) -> Result<Option<MemeTemplate>, MediaError>;

    /// Render a meme from a template and two text boxes; returns the URL.
    async fn render(
        &self,
        template_id: &str,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<String, MediaError>;
}
