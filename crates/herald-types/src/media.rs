//! Media-generation parameter and status types.
//!
//! These are the structured outputs of the per-processor extraction calls
//! (meme template + texts, image prompt, image + motion prompt) and the
//! status shape of the polling video collaborator.

use serde::{Deserialize, Serialize};

/// Sentinel returned by the episodic-event detection call when no qualifying
/// event is present in the analyzed turns.
pub const NO_EPISODIC_EVENT: &str = "NOEPISODICEVENT";

/// Meme parameters extracted from a free-text message.
///
/// Fields are optional because the extraction call returns `null` for
/// anything it cannot determine confidently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeParams {
    pub meme_name: Option<String>,
    pub top_text: Option<String>,
    pub bottom_text: Option<String>,
}

/// Image-generation prompt extracted from a free-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParams {
    pub image_gen_prompt: Option<String>,
}

/// Image + motion prompts for the two-stage video pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoParams {
    pub image_gen_prompt: Option<String>,
    pub video_gen_prompt: Option<String>,
}

/// Result of the episodic-event detection call: at most one fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodicFinding {
    pub fact: String,
}

impl EpisodicFinding {
    /// Whether the detection call found a qualifying event.
    pub fn is_event(&self) -> bool {
        self.fact != NO_EPISODIC_EVENT && !self.fact.trim().is_empty()
    }
}

/// A caption-service meme template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeTemplate {
    pub id: String,
    pub name: String,
}

/// Terminal and non-terminal states of a video-generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoTaskStatus {
    Pending,
    Running,
    Succeeded { output_url: String },
    Failed,
}

impl VideoTaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoTaskStatus::Succeeded { .. } | VideoTaskStatus::Failed)
    }
}
