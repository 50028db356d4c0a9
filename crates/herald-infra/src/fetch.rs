//! Page fetching and content extraction.
//!
//! Fetches a URL with a per-request timeout and extracts a title and the
//! readable body text. Only a literal 200 counts as success; redirects the
//! client could not follow, soft errors, and paywalled stubs all surface as
//! [`FetchError`] and are excluded upstream.
//!
//! HTML parsing is kept fully synchronous: `scraper::Html` is not `Send` and
//! must never be held across an await point.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use herald_core::retrieval::PageFetcher;
use herald_types::config::RetrievalConfig;
use herald_types::document::FetchedPage;
use herald_types::error::FetchError;

// Rotated per request. News sites throttle a repeated single agent string.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
];

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("og:title selector is valid")
});
static H1: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("h1 selector is valid"));
static ARTICLE_P: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article p").expect("article p selector is valid"));
static CONTENT_P: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.article-body p, div.post-content p, div.entry-content p, div.story-body p")
        .expect("content class selector is valid")
});
static ITEMPROP_P: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[itemprop="articleBody"] p"#).expect("itemprop selector is valid")
});
static MAIN_P: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main p").expect("main p selector is valid"));
static ANY_P: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("p selector is valid"));

/// HTTP page fetcher with readable-text extraction.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    next_agent: AtomicUsize,
}

impl HttpPageFetcher {
    pub fn new(config: &RetrievalConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            next_agent: AtomicUsize::new(0),
        }
    }

    fn user_agent(&self) -> &'static str {
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[index % USER_AGENTS.len()]
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let page = extract_page(&html);
        if page.text.trim().is_empty() {
            return Err(FetchError::EmptyContent);
        }
        Ok(page)
    }
}

/// Extract title and body text from raw HTML.
///
/// Title fallback chain: first `<h1>`, `og:title` meta, `<title>`. Body
/// fallback chain: paragraphs under `<article>`, under the common content
/// container classes, under `div[itemprop=articleBody]`, under `<main>`,
/// then anywhere in the document.
fn extract_page(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&H1)
        .next()
        .map(|el| el.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            document
                .select(&OG_TITLE)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(str::to_string)
        })
        .or_else(|| {
            document
                .select(&TITLE)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    let text = [&*ARTICLE_P, &*CONTENT_P, &*ITEMPROP_P, &*MAIN_P, &*ANY_P]
        .iter()
        .map(|selector| paragraphs(&document, selector))
        .find(|body| !body.is_empty())
        .unwrap_or_default();

    FetchedPage { title, text }
}

fn paragraphs(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
