//! Background job processors.
//!
//! Each processor pairs a synchronous turn path with a single-consumer job
//! queue. On the turn path it derives whatever parameters need the live
//! dialogue, enqueues a job, and returns a short acknowledgment for the user.
//! The heavy work runs later on the queue's worker and delivers its result
//! through the notification channel.

pub mod article;
pub mod episodic;
pub mod image;
pub mod meme;
pub mod social;
pub mod video;

use herald_types::document::RankedPassage;
use herald_types::llm::{CompletionRequest, LlmError};

use crate::llm::TextGenerator;

const ACK_MAX_TOKENS: u32 = 192;

const ACK_PROMPT: &str = r#"You are a warm, capable assistant. The user just asked you to ${task},
and the work has been queued in the background. Write one short, natural
message (two sentences at most) telling them you are on it. Do not promise a
completion time and do not describe the steps involved.

Recent dialogue:
${dialogue}
"#;

/// Generate the immediate conversational acknowledgment for a queued job.
pub(crate) async fn acknowledge(
    generator: &dyn TextGenerator,
    model: &str,
    task: &str,
    window: &str,
) -> Result<String, LlmError> {
    let prompt = ACK_PROMPT
        .replace("${task}", task)
        .replace("${dialogue}", window);
    let mut request = CompletionRequest::from_prompt(model, prompt, ACK_MAX_TOKENS);
    request.temperature = Some(0.08);
    request.frequency_penalty = Some(1.1);
    let response = generator.complete(&request).await?;
    Ok(response.content.trim().to_string())
}

/// One retrieved source as it appears in a generation prompt.
pub(crate) struct PromptSource {
    pub title: String,
    pub url: String,
    pub text: String,
}

/// Read title/url out of ranked-passage metadata.
pub(crate) fn passages_to_sources(passages: &[RankedPassage]) -> Vec<PromptSource> {
    passages
        .iter()
        .map(|passage| PromptSource {
            title: passage
                .metadata
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            url: passage
                .metadata
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            text: passage.text.clone(),
        })
        .collect()
}

/// Render retrieved sources as an XML block for a generation prompt.
///
/// Field values are escaped so source text can never break the structure the
/// prompt promises the model.
pub(crate) fn sources_to_context(sources: &[PromptSource]) -> String {
    let mut out = String::from("<sources>\n");
    for source in sources {
        out.push_str("  <source>\n");
        out.push_str(&format!("    <title>{}</title>\n", xml_escape(&source.title)));
        out.push_str(&format!("    <url>{}</url>\n", xml_escape(&source.url)));
        out.push_str(&format!(
            "    <content>{}</content>\n",
            xml_escape(&source.text)
        ));
        out.push_str("  </source>\n");
    }
    out.push_str("</sources>");
    out
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
