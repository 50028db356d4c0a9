//! Social-post processor.
//!
//! Same retrieval-and-generate shape as the article pipeline, minus the
//! crystallization step: a post is delivered and forgotten. The target
//! platform is inferred by the generation prompt itself, not as a separate
//! step.

use std::sync::Arc;

use serde_json::json;

use herald_types::error::{JobError, TurnError};
use herald_types::intent::TopicSpec;
use herald_types::job::{JobRequest, SocialPostJob};
use herald_types::llm::CompletionRequest;

use crate::chunk::chunk_documents;
use crate::llm::TextGenerator;
use crate::notify::NotificationChannel;
use crate::processor::article::NEWS_CORPUS_KEY;
use crate::processor::{acknowledge, passages_to_sources, sources_to_context};
use crate::queue::{FailureHandler, JobQueue};
use crate::retrieval::Retriever;
use crate::vector::VectorStore;

const RANKED_PASSAGE_LIMIT: usize = 8;

const POST_MAX_TOKENS: u32 = 1024;

const POST_PROMPT: &str = r#"Write a social media post.

Main topic: ${main_topic}
Target audience: ${target_audience}
Tone: ${tone}
What was asked: ${context}
The user's request, verbatim: ${request}

Infer the target platform from the request; if it does not name one, write
for twitter. Match that platform's length and conventions. Ground every claim
in the sources below. Ignore any field above marked "not_specified". Output
only the post text.

${sources}
"#;

struct SocialWorker {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    retriever: Arc<Retriever>,
    store: Arc<dyn VectorStore>,
    notifier: Arc<dyn NotificationChannel>,
    per_query_limit: usize,
}

impl SocialWorker {
    #[tracing::instrument(skip_all, fields(main_topic = %job.topic.main_topic))]
    async fn run(&self, job: SocialPostJob) -> Result<(), JobError> {
        let topic = &job.topic;
        let queries = super::article::search_queries(topic);
        let documents = self.retriever.search(&queries, self.per_query_limit).await?;
        let documents = chunk_documents(documents);
        for doc in &documents {
            self.store
                .add_document(
                    NEWS_CORPUS_KEY,
                    &doc.title,
                    json!({ "title": doc.title, "url": doc.url }),
                    &doc.chunks,
                )
                .await?;
        }

        let query = format!("{}: {}", topic.main_topic, topic.context);
        let passages = self
            .store
            .query(NEWS_CORPUS_KEY, &query, RANKED_PASSAGE_LIMIT, true)
            .await?;
        let sources = passages_to_sources(&passages);

        let prompt = POST_PROMPT
            .replace("${main_topic}", &topic.main_topic)
            .replace("${target_audience}", &topic.target_audience)
            .replace("${tone}", &topic.tone)
            .replace("${context}", &topic.context)
            .replace("${request}", &job.last_user_message)
            .replace("${sources}", &sources_to_context(&sources));
        let mut request =
            CompletionRequest::from_prompt(&self.interaction_model, prompt, POST_MAX_TOKENS);
        request.temperature = Some(0.08);
        request.frequency_penalty = Some(1.1);
        let post = self.generator.complete(&request).await?.content;

        self.notifier.send(&post).await?;
        Ok(())
    }
}

/// Turn-path handle for social-post requests.
pub struct SocialPostProcessor {
    generator: Arc<dyn TextGenerator>,
    notification_model: String,
    queue: JobQueue<SocialPostJob>,
}

impl SocialPostProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        interaction_model: impl Into<String>,
        notification_model: impl Into<String>,
        retriever: Arc<Retriever>,
        store: Arc<dyn VectorStore>,
        notifier: Arc<dyn NotificationChannel>,
        per_query_limit: usize,
        failure: Arc<dyn FailureHandler>,
    ) -> Self {
        let worker = Arc::new(SocialWorker {
            generator: generator.clone(),
            interaction_model: interaction_model.into(),
            retriever,
            store,
            notifier,
            per_query_limit,
        });
        let queue = JobQueue::spawn("social", failure, move |job: JobRequest<SocialPostJob>| {
            let worker = worker.clone();
            async move { worker.run(job.payload).await }
        });
        Self {
            generator,
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
        self.queue.submit(JobRequest::new(SocialPostJob {
            topic: topic.clone(),
            last_user_message: last_user_message.to_string(),
        }))?;
        let task = format!("compose a social media post about {}", topic.main_topic);
        let ack = acknowledge(
            self.generator.as_ref(),
            &self.notification_model,
            &task,
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
