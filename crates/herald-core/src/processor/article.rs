//! Article-writing processor.
//!
//! The heaviest pipeline: search the web for the classified topic, index the
//! fetched pages into the news corpus, pull the best-ranked passages back
//! out, generate a sourced article, deliver it, and crystallize it into
//! long-term memory.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use herald_types::error::{JobError, TurnError};
use herald_types::intent::{NOT_SPECIFIED, TopicSpec};
use herald_types::job::{ArticleJob, JobRequest};
use herald_types::llm::CompletionRequest;

use crate::chunk::chunk_documents;
use crate::llm::TextGenerator;
use crate::memory::KnowledgeCrystallizer;
use crate::notify::NotificationChannel;
use crate::processor::{acknowledge, passages_to_sources, sources_to_context};
use crate::queue::{FailureHandler, JobQueue};
use crate::retrieval::Retriever;
use crate::vector::VectorStore;

/// Corpus receiving retrieved web pages.
pub const NEWS_CORPUS_KEY: &str = "herald_news";

/// How many reranked passages feed the generation prompt.
const RANKED_PASSAGE_LIMIT: usize = 8;

const ARTICLE_MAX_TOKENS: u32 = 3072;

const ARTICLE_PROMPT: &str = r#"Write a complete article.

Main topic: ${main_topic}
Subtopics: ${subtopics}
Target audience: ${target_audience}
Tone: ${tone}
Complexity: ${complexity}
What was asked: ${context}
The user's request, verbatim: ${request}

Ground the article in the sources below. Use only facts that appear in them;
where a detail matters, it should be traceable to a source. Start with a
title on its own first line, then the body. Ignore any field above marked
"not_specified".

${sources}
"#;

struct ArticleWorker {
    generator: Arc<dyn TextGenerator>,
    interaction_model: String,
    retriever: Arc<Retriever>,
    store: Arc<dyn VectorStore>,
    crystallizer: KnowledgeCrystallizer,
    notifier: Arc<dyn NotificationChannel>,
    per_query_limit: usize,
}

impl ArticleWorker {
    #[tracing::instrument(skip_all, fields(main_topic = %job.topic.main_topic))]
    async fn run(&self, job: ArticleJob) -> Result<(), JobError> {
        let topic = &job.topic;
        let queries = search_queries(topic);
        let documents = self.retriever.search(&queries, self.per_query_limit).await?;
        let documents = chunk_documents(documents);
        tracing::debug!(document_count = documents.len(), "indexing retrieved pages");
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

        let prompt = ARTICLE_PROMPT
            .replace("${main_topic}", &topic.main_topic)
            .replace("${subtopics}", &topic.subtopics.join(", "))
            .replace("${target_audience}", &topic.target_audience)
            .replace("${tone}", &topic.tone)
            .replace("${complexity}", &topic.complexity)
            .replace("${context}", &topic.context)
            .replace("${request}", &job.last_user_message)
            .replace("${sources}", &sources_to_context(&sources));
        let mut request =
            CompletionRequest::from_prompt(&self.interaction_model, prompt, ARTICLE_MAX_TOKENS);
        request.temperature = Some(0.08);
        request.frequency_penalty = Some(1.1);
        let article = self.generator.complete(&request).await?.content;

        self.notifier.send(&article).await?;

        let title = article
            .lines()
            .next()
            .unwrap_or("Untitled article")
            .trim_start_matches('#')
            .trim();
        self.crystallizer
            .crystallize(title, "article_writing", "own", &article)
            .await?;
        Ok(())
    }
}

/// Context first, then the main topic, then subtopics; sentinel values and
/// duplicates dropped.
pub(crate) fn search_queries(topic: &TopicSpec) -> Vec<String> {
    let mut queries = vec![topic.context.clone(), topic.main_topic.clone()];
    queries.extend(topic.subtopics.iter().cloned());
    let mut seen = HashSet::new();
    queries.retain(|q| {
        let q = q.trim();
        !q.is_empty() && q != NOT_SPECIFIED && seen.insert(q.to_string())
    });
    queries
}

/// Turn-path handle for article requests.
pub struct ArticleProcessor {
    generator: Arc<dyn TextGenerator>,
    notification_model: String,
    queue: JobQueue<ArticleJob>,
}

impl ArticleProcessor {
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
        let interaction_model = interaction_model.into();
        let worker = Arc::new(ArticleWorker {
            generator: generator.clone(),
            interaction_model: interaction_model.clone(),
            retriever,
            store: store.clone(),
            crystallizer: KnowledgeCrystallizer::new(generator.clone(), interaction_model, store),
            notifier,
            per_query_limit,
        });
        let queue = JobQueue::spawn("article", failure, move |job: JobRequest<ArticleJob>| {
            let worker = worker.clone();
            async move { worker.run(job.payload).await }
        });
        Self {
            generator,
            notification_model: notification_model.into(),
            queue,
        }
    }

    /// Enqueue the article job and return the immediate acknowledgment.
    pub async fn handle_content_request(
        &self,
        window: &str,
        topic: &TopicSpec,
        last_user_message: &str,
    ) -> Result<String, TurnError> {
        self.queue.submit(JobRequest::new(ArticleJob {
            topic: topic.clone(),
            last_user_message: last_user_message.to_string(),
        }))?;
        let task = format!("write an article about {}", topic.main_topic);
        let ack = acknowledge(
            self.generator.as_ref(),
            &self.notification_model,
            &task,
            window,
        )
        .await?;
        Ok(ack)
    }

    /// Stop accepting jobs and wait for queued work to drain.
    pub async fn shutdown(&self) {
        self.queue.close();
        self.queue.join().await;
    }
}
