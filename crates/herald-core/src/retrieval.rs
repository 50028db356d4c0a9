//! Bounded-concurrency web retrieval.
//!
//! The retriever fans a list of search queries out to the search provider,
//! unions and dedups the resulting URLs against an instance-scoped seen set,
//! then fetches the unseen ones with a fixed cap on in-flight requests. A
//! fetch that errors, times out, or yields an empty body is excluded from the
//! result set, never raised: partial failure degrades to fewer documents.
//!
//! Search-provider titles take precedence over scraped titles when building
//! the returned documents.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;

use herald_types::config::RetrievalConfig;
use herald_types::document::{FetchedPage, SearchHit, SourceDocument};
use herald_types::error::{FetchError, SearchError};

/// Initial backoff between fetch attempts; doubles per attempt.
const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Port for the external search API.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Port for fetching and extracting a single page.
///
/// Implementations own the per-request timeout; a timeout surfaces as
/// [`FetchError::Timeout`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Dedup cache of already-fetched URLs.
///
/// Explicitly owned by the retriever instance rather than process-global.
/// It only grows for the life of the instance; [`SeenUrls::reset`] is the
/// one escape hatch.
#[derive(Default)]
pub struct SeenUrls {
    inner: Mutex<HashSet<String>>,
}

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the subset of `urls` not seen before, marking them seen.
    /// Order is preserved; duplicates within the batch are claimed once.
    pub fn claim_unseen(&self, urls: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut seen = self.inner.lock().expect("seen-url lock poisoned");
        urls.into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Forget everything. Subsequent calls fetch previously seen URLs again.
    pub fn reset(&self) {
        self.inner.lock().expect("seen-url lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("seen-url lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent, deduplicating web retriever.
pub struct Retriever {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    seen: SeenUrls,
    max_concurrent: usize,
    retry_attempts: u32,
}

impl Retriever {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            search,
            fetcher,
            seen: SeenUrls::new(),
            max_concurrent: config.max_concurrent.max(1),
            retry_attempts: config.retry_attempts.max(1),
        }
    }

    /// The seen-URL cache, exposed for explicit reset.
    pub fn seen_urls(&self) -> &SeenUrls {
        &self.seen
    }

    /// Search each query, then fetch every unseen result URL.
    ///
    /// Search-provider failures propagate; per-URL fetch failures degrade to
    /// fewer documents.
    #[tracing::instrument(skip_all, fields(query_count = queries.len()))]
    pub async fn search(
        &self,
        queries: &[String],
        per_query_limit: usize,
    ) -> Result<Vec<SourceDocument>, SearchError> {
        let mut title_by_url: HashMap<String, String> = HashMap::new();
        let mut ordered_urls: Vec<String> = Vec::new();

        for query in queries {
            let hits = self.search.search(query, per_query_limit).await?;
            for hit in hits {
                if !title_by_url.contains_key(&hit.url) {
                    ordered_urls.push(hit.url.clone());
                }
                title_by_url.entry(hit.url).or_insert(hit.title);
            }
        }

        let unseen = self.seen.claim_unseen(ordered_urls);
        tracing::debug!(unseen = unseen.len(), "fetching unseen result urls");
        if unseen.is_empty() {
            return Ok(Vec::new());
        }

        let fetches = stream::iter(unseen.into_iter().map(|url| async move {
            let result = self.fetch_with_retry(&url).await;
            (url, result)
        }));
        let results: Vec<(String, Result<FetchedPage, FetchError>)> =
            fetches.buffer_unordered(self.max_concurrent).collect().await;

        let documents = results
            .into_iter()
            .filter_map(|(url, result)| match result {
                Ok(page) if !page.text.trim().is_empty() => Some((url, page)),
                Ok(_) => {
                    tracing::debug!(%url, "fetched page had no content, excluding");
                    None
                }
                Err(error) => {
                    tracing::debug!(%url, %error, "fetch failed, excluding");
                    None
                }
            })
            .map(|(url, page)| {
                let api_title = title_by_url
                    .get(&url)
                    .filter(|title| !title.trim().is_empty());
                SourceDocument {
                    title: api_title.cloned().unwrap_or(page.title),
                    url,
                    text: page.text,
                    chunks: Vec::new(),
                }
            })
            .collect();

        Ok(documents)
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut backoff = RETRY_BACKOFF_BASE;
        let mut last_error = FetchError::Request("no attempts made".to_string());
        for attempt in 1..=self.retry_attempts {
            match self.fetcher.fetch(url).await {
                Ok(page) => return Ok(page),
                Err(error) => {
                    tracing::debug!(%url, attempt, %error, "fetch attempt failed");
                    // Client rejections and empty pages are not transient.
                    if matches!(
                        error,
                        FetchError::EmptyContent | FetchError::Status(400..=499)
                    ) {
                        return Err(error);
                    }
                    last_error = error;
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct StubSearch {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str, _count: usize) -> Result<Vec<SearchHit>, SearchError> {
            Ok(self.hits.clone())
        }
    }

    struct StubFetcher {
        pages: HashMap<String, Result<FetchedPage, ()>>,
        calls: StdMutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: impl IntoIterator<Item = (&'static str, Result<FetchedPage, ()>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
                calls: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(())) => Err(FetchError::Timeout),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn page(text: &str) -> Result<FetchedPage, ()> {
        Ok(FetchedPage {
            title: String::new(),
            text: text.to_string(),
        })
    }

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    fn retriever(search: StubSearch, fetcher: Arc<StubFetcher>) -> Retriever {
        Retriever::new(
            Arc::new(search),
            fetcher,
            &RetrievalConfig {
                max_concurrent: 10,
                timeout_secs: 10,
                retry_attempts: 1,
            },
        )
    }

    #[tokio::test]
    async fn api_title_overrides_empty_scraped_title() {
        let fetcher = Arc::new(StubFetcher::new([("http://x", page("full article body..."))]));
        let retriever = retriever(
            StubSearch {
                hits: vec![hit("http://x", "X")],
            },
            fetcher,
        );

        let docs = retriever.search(&["A".to_string()], 1).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "X");
        assert_eq!(docs[0].text, "full article body...");
    }

    #[tokio::test]
    async fn timed_out_fetch_is_excluded_not_raised() {
        let fetcher = Arc::new(StubFetcher::new([
            ("http://a", page("body a")),
            ("http://b", Err(())),
            ("http://c", page("body c")),
        ]));
        let retriever = retriever(
            StubSearch {
                hits: vec![hit("http://a", "A"), hit("http://b", "B"), hit("http://c", "C")],
            },
            fetcher,
        );

        let docs = retriever.search(&["q".to_string()], 3).await.unwrap();
        assert_eq!(docs.len(), 2);
        let mut urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        urls.sort_unstable();
        assert_eq!(urls, vec!["http://a", "http://c"]);
    }

    #[tokio::test]
    async fn empty_pages_are_excluded() {
        let fetcher = Arc::new(StubFetcher::new([("http://a", page("  \n "))]));
        let retriever = retriever(
            StubSearch {
                hits: vec![hit("http://a", "A")],
            },
            fetcher,
        );
        let docs = retriever.search(&["q".to_string()], 1).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn dedup_is_monotonic_and_cumulative() {
        let fetcher = Arc::new(StubFetcher::new([
            ("http://a", page("body a")),
            ("http://b", page("body b")),
        ]));
        let retriever = retriever(
            StubSearch {
                hits: vec![hit("http://a", "A"), hit("http://b", "B")],
            },
            fetcher.clone(),
        );

        let first = retriever.search(&["q".to_string()], 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(fetcher.calls.lock().unwrap().len(), 2);

        // Same hits again: everything already seen, nothing fetched.
        let second = retriever.search(&["q".to_string()], 2).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(fetcher.calls.lock().unwrap().len(), 2);
        assert_eq!(retriever.seen_urls().len(), 2);

        // After reset the same URLs are fetched again.
        retriever.seen_urls().reset();
        let third = retriever.search(&["q".to_string()], 2).await.unwrap();
        assert_eq!(third.len(), 2);
        assert_eq!(fetcher.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        struct GoneFetcher {
            calls: StdMutex<u32>,
        }

        #[async_trait]
        impl PageFetcher for GoneFetcher {
            async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
                *self.calls.lock().unwrap() += 1;
                Err(FetchError::Status(404))
            }
        }

        let fetcher = Arc::new(GoneFetcher {
            calls: StdMutex::new(0),
        });
        let retriever = Retriever::new(
            Arc::new(StubSearch {
                hits: vec![hit("http://gone", "G")],
            }),
            fetcher.clone(),
            &RetrievalConfig {
                max_concurrent: 10,
                timeout_secs: 10,
                retry_attempts: 2,
            },
        );

        let docs = retriever.search(&["q".to_string()], 1).await.unwrap();
        assert!(docs.is_empty());
        assert_eq!(*fetcher.calls.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        struct FlakyFetcher {
            calls: StdMutex<u32>,
        }

        #[async_trait]
        impl PageFetcher for FlakyFetcher {
            async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    Err(FetchError::Request("connection reset".to_string()))
                } else {
                    Ok(FetchedPage {
                        title: "T".to_string(),
                        text: "recovered body".to_string(),
                    })
                }
            }
        }

        let fetcher = Arc::new(FlakyFetcher {
            calls: StdMutex::new(0),
        });
        let retriever = Retriever::new(
            Arc::new(StubSearch {
                hits: vec![hit("http://flaky", "F")],
            }),
            fetcher.clone(),
            &RetrievalConfig {
                max_concurrent: 10,
                timeout_secs: 10,
                retry_attempts: 2,
            },
        );

        let docs = retriever.search(&["q".to_string()], 1).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "recovered body");
        assert_eq!(*fetcher.calls.lock().unwrap(), 2);
    }
}
