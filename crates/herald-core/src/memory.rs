//! Fact crystallization into long-term semantic memory.
//!
//! After a piece of content is produced, its text is distilled into a
//! numbered list of standalone facts and written to the semantic corpus as
//! one document whose parts are the individual facts. Crystallization is
//! fire-and-forget from the caller's point of view: it runs inside the job
//! that produced the content.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use herald_types::error::JobError;
use herald_types::llm::CompletionRequest;

use crate::llm::TextGenerator;
use crate::vector::VectorStore;

/// Corpus receiving crystallized facts.
pub const SEMANTIC_CORPUS_KEY: &str = "herald_semantic";

const CRYSTALLIZE_MAX_TOKENS: u32 = 8000;

const CRYSTALLIZE_PROMPT: &str = r#"Distill the text below into a numbered list of standalone facts.
Each fact must be a complete sentence that makes sense without the others and
without the original text. Keep names, numbers, and dates. Do not editorialize
and do not add facts that are not in the text. Output only the numbered list.

Text:
${input}
"#;

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("numbered-item pattern is valid"));

/// Parse a numbered list, folding continuation lines into the preceding item.
///
/// Lines that match `N. text` start a new fact; non-empty lines that do not
/// are appended to the current fact. Leading prose before the first numbered
/// line is ignored.
pub fn parse_numbered_list(raw: &str) -> Vec<String> {
    let mut facts: Vec<String> = Vec::new();
    for line in raw.lines() {
        if let Some(captures) = NUMBERED_ITEM.captures(line) {
            facts.push(captures[1].trim().to_string());
        } else if let Some(current) = facts.last_mut() {
            let continuation = line.trim();
            if !continuation.is_empty() {
                current.push(' ');
                current.push_str(continuation);
            }
        }
    }
    facts.retain(|fact| !fact.is_empty());
    facts
}

/// Distills produced content into facts and stores them.
pub struct KnowledgeCrystallizer {
    generator: Arc<dyn TextGenerator>,
    model: String,
    store: Arc<dyn VectorStore>,
}

impl KnowledgeCrystallizer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        model: impl Into<String>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            store,
        }
    }

    /// Extract facts from `content` and write them to the semantic corpus as
    /// one document. Content that yields no facts is skipped without error.
    #[tracing::instrument(skip_all, fields(title))]
    pub async fn crystallize(
        &self,
        title: &str,
        reason: &str,
        source: &str,
        content: &str,
    ) -> Result<(), JobError> {
        let prompt = CRYSTALLIZE_PROMPT.replace("${input}", content);
        let mut request =
            CompletionRequest::from_prompt(&self.model, prompt, CRYSTALLIZE_MAX_TOKENS);
        request.temperature = Some(0.08);
        request.frequency_penalty = Some(1.1);

        let response = self.generator.complete(&request).await?;
        let facts = parse_numbered_list(&response.content);
        if facts.is_empty() {
            tracing::debug!("no facts extracted, skipping memory write");
            return Ok(());
        }

        tracing::debug!(fact_count = facts.len(), "storing crystallized facts");
        self.store
            .add_document(
                SEMANTIC_CORPUS_KEY,
                title,
                json!({ "reason": reason, "source": source }),
                &facts,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingStore, ScriptedGenerator};

    #[test]
    fn test_parse_simple_numbered_list() {
        let raw = "1. Mars has two moons.\n2. Phobos orbits faster than Deimos.\n3. Both are irregular.";
        let facts = parse_numbered_list(raw);
        assert_eq!(
            facts,
            vec![
                "Mars has two moons.",
                "Phobos orbits faster than Deimos.",
                "Both are irregular.",
            ]
        );
    }

    #[test]
    fn test_parse_folds_continuation_lines() {
        let raw = "1. Mars has two moons,\n   Phobos and Deimos.\n2. Both are small.";
        let facts = parse_numbered_list(raw);
        assert_eq!(
            facts,
            vec!["Mars has two moons, Phobos and Deimos.", "Both are small."]
        );
    }

    #[test]
    fn test_parse_ignores_preamble_and_blank_lines() {
        let raw = "Here are the facts:\n\n1. First fact.\n\n2. Second fact.";
        let facts = parse_numbered_list(raw);
        assert_eq!(facts, vec!["First fact.", "Second fact."]);
    }

    #[test]
    fn test_parse_unnumbered_text_yields_nothing() {
        assert!(parse_numbered_list("just a paragraph of prose with no list").is_empty());
    }

    #[tokio::test]
    async fn crystallize_stores_one_document_per_call() {
        let generator = Arc::new(ScriptedGenerator::new([
            "1. Mars has two moons.\n2. Both are irregular.",
            "1. Mars has two moons.\n2. Both are irregular.",
        ]));
        let store = Arc::new(RecordingStore::new());
        let crystallizer =
            KnowledgeCrystallizer::new(generator, "interaction-model", store.clone());

        crystallizer
            .crystallize("Moons of Mars", "article_writing", "own", "article body")
            .await
            .unwrap();
        crystallizer
            .crystallize("Moons of Mars", "article_writing", "own", "article body")
            .await
            .unwrap();

        // Each call produces its own document; dedup is the store's concern.
        let documents = store.documents();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].corpus_key, SEMANTIC_CORPUS_KEY);
        assert_eq!(documents[0].title, "Moons of Mars");
        assert_eq!(documents[0].metadata["reason"], "article_writing");
        assert_eq!(documents[0].metadata["source"], "own");
        assert_eq!(
            documents[0].parts,
            vec!["Mars has two moons.", "Both are irregular."]
        );
    }

    #[tokio::test]
    async fn crystallize_skips_write_when_no_facts_found() {
        let generator = Arc::new(ScriptedGenerator::new(["No list here."]));
        let store = Arc::new(RecordingStore::new());
        let crystallizer = KnowledgeCrystallizer::new(generator, "m", store.clone());
        crystallizer
            .crystallize("T", "article_writing", "own", "content")
            .await
            .unwrap();
        assert!(store.documents().is_empty());
    }
}
