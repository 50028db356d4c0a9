//! Job requests and per-processor payloads.
//!
//! A [`JobRequest`] is created on the synchronous ack path, pushed onto its
//! processor's queue, and exclusively owned by that queue/worker pair until
//! the worker finishes. It is never persisted and no component holds a
//! back-reference to it afterward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::TopicSpec;
use crate::media::{ImageParams, MemeParams, VideoParams};

/// Lifecycle status of a job request.
///
/// Set to `Pending` at creation and never transitioned afterward; a stub for
/// a future status-tracking feature, kept inert on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
}

/// A unit of background work for one processor.
#[derive(Debug, Clone)]
pub struct JobRequest<P> {
    pub id: Uuid,
    pub payload: P,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl<P> JobRequest<P> {
    pub fn new(payload: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            status: JobStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Payload for the article-writing pipeline.
#[derive(Debug, Clone)]
pub struct ArticleJob {
    pub topic: TopicSpec,
    pub last_user_message: String,
}

/// Payload for the social-post pipeline.
#[derive(Debug, Clone)]
pub struct SocialPostJob {
    pub topic: TopicSpec,
    pub last_user_message: String,
}

/// Payload for the meme pipeline; parameters were already extracted on the
/// ack path.
#[derive(Debug, Clone)]
pub struct MemeJob {
    pub params: MemeParams,
}

/// Payload for the image-generation pipeline.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub params: ImageParams,
}

/// Payload for the video-generation pipeline.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub params: VideoParams,
}

/// Payload for the episodic-memory pipeline: one already-detected
/// autobiographical fact.
#[derive(Debug, Clone)]
pub struct EpisodicJob {
    pub fact: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requests_get_unique_ids() {
        let a = JobRequest::new(EpisodicJob {
            fact: "caught first bass at Lake Michigan".to_string(),
        });
        let b = JobRequest::new(EpisodicJob {
            fact: "caught first bass at Lake Michigan".to_string(),
        });
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, JobStatus::Pending);
        assert_eq!(b.status, JobStatus::Pending);
    }
}
