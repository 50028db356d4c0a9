//! Sliding-window text chunking for indexing.
//!
//! Splits article text into overlapping fragments sized for embedding.
//! Fragments shorter than [`MIN_CHUNK_CHARS`] are discarded -- they are too
//! small to carry standalone meaning and would only add index noise. A
//! document left with zero fragments is dropped from indexing entirely.

use text_splitter::{ChunkConfig, TextSplitter};

use herald_types::document::SourceDocument;

/// Target fragment size in characters.
pub const CHUNK_TARGET: usize = 1024;

/// Overlap between consecutive fragments in characters.
pub const CHUNK_OVERLAP: usize = 280;

/// Fragments below this length are discarded.
pub const MIN_CHUNK_CHARS: usize = 280;

/// Split one text into overlapping fragments, dropping undersized ones.
pub fn chunk_text(text: &str) -> Vec<String> {
    let config = ChunkConfig::new(CHUNK_TARGET)
        .with_overlap(CHUNK_OVERLAP)
        .expect("overlap is smaller than the chunk target");
    let splitter = TextSplitter::new(config);
    splitter
        .chunks(text)
        .filter(|chunk| chunk.chars().count() >= MIN_CHUNK_CHARS)
        .map(str::to_string)
        .collect()
}

/// Fill `chunks` on each document and drop documents with no surviving
/// fragments.
pub fn chunk_documents(documents: Vec<SourceDocument>) -> Vec<SourceDocument> {
    documents
        .into_iter()
        .filter_map(|mut doc| {
            doc.chunks = chunk_text(&doc.text);
            if doc.chunks.is_empty() {
                tracing::debug!(url = %doc.url, "document produced no usable chunks, dropping");
                None
            } else {
                Some(doc)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> SourceDocument {
        SourceDocument {
            title: "T".to_string(),
            url: "http://x".to_string(),
            text: text.to_string(),
            chunks: Vec::new(),
        }
    }

    #[test]
    fn test_short_text_yields_no_chunks() {
        assert!(chunk_text("too short to matter").is_empty());
        assert!(chunk_text(&"a".repeat(MIN_CHUNK_CHARS - 1)).is_empty());
    }

    #[test]
    fn test_chunks_respect_size_bounds() {
        let sentence = "The quick brown fox jumps over the lazy dog near the riverbank. ";
        let text = sentence.repeat(80); // ~5k characters
        let chunks = chunk_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            let len = chunk.chars().count();
            assert!(len >= MIN_CHUNK_CHARS, "undersized chunk of {len} chars");
            assert!(len <= CHUNK_TARGET, "oversized chunk of {len} chars");
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let sentence = "Every fact in this corpus deserves to appear in two windows. ";
        let text = sentence.repeat(80);
        let chunks = chunk_text(&text);
        assert!(chunks.len() > 1);
        // The tail of each chunk reappears at the head of the next one.
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .chars()
                .skip(pair[0].chars().count().saturating_sub(40))
                .collect();
            assert!(
                pair[1].contains(tail.trim()),
                "no overlap between consecutive chunks"
            );
        }
    }

    #[test]
    fn test_documents_without_chunks_are_dropped() {
        let sentence = "A long enough body keeps its document in the index. ";
        let keep = doc(&sentence.repeat(40));
        let drop = doc("tiny");
        let chunked = chunk_documents(vec![keep, drop]);
        assert_eq!(chunked.len(), 1);
        assert_eq!(chunked[0].title, "T");
        assert!(!chunked[0].chunks.is_empty());
    }
}
