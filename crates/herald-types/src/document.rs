//! Retrieved-document types.

use serde::{Deserialize, Serialize};

/// One search-provider result: a URL plus the provider's own title for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
}

/// Raw page content as returned by a fetcher, before title back-filling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub text: String,
}

/// A fetched source article, optionally carrying its chunked fragments.
///
/// Never mutated after the chunking step fills `chunks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub title: String,
    pub url: String,
    pub text: String,
    #[serde(default)]
    pub chunks: Vec<String>,
}

/// One ranked passage returned by a vector-store query.
///
/// `metadata` is the document-level metadata the passage came from (title,
/// url, and whatever else the store attached).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPassage {
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_document_chunks_default_empty() {
        let json = r#"{"title": "T", "url": "http://x", "text": "body"}"#;
        let doc: SourceDocument = serde_json::from_str(json).unwrap();
        assert!(doc.chunks.is_empty());
    }

    #[test]
    fn test_ranked_passage_metadata_default_null() {
        let json = r#"{"text": "a passage"}"#;
        let passage: RankedPassage = serde_json::from_str(json).unwrap();
        assert!(passage.metadata.is_null());
    }
}
