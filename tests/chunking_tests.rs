//! Tests for the fixed-window and token-aware chunkers.

use proptest::prelude::*;
use ragkit::{Chunker, Document, FixedSizeChunker, RagError, TokenChunker};

fn doc(text: &str) -> Document {
    Document::new("doc", text)
}

/// Reassemble the original text from overlapping chunks: the first chunk
/// whole, then each subsequent chunk with its leading `overlap` characters
/// removed.
fn reconstruct(chunks: &[String], overlap: usize) -> String {
    let mut text = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            text.push_str(chunk);
        } else {
            text.extend(chunk.chars().skip(overlap));
        }
    }
    text
}

#[test]
fn fixed_window_covers_text_exactly() {
    let text = "abcdefghijklmnopqrstuvwxy";
    let chunker = FixedSizeChunker::new(10, 3).unwrap();
    let chunks = chunker.chunk(&doc(text)).unwrap();
    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

    assert_eq!(reconstruct(&contents, 3), text);
    // Window start advances by chunk_size - chunk_overlap, so the chunk
    // count is ceil(len / step).
    assert_eq!(chunks.len(), text.len().div_ceil(10 - 3));
    assert!(chunks.iter().all(|c| c.content.chars().count() <= 10));
}

#[test]
fn fixed_window_is_deterministic() {
    let text = "The quick brown fox jumps over the lazy dog. Again and again.";
    let chunker = FixedSizeChunker::new(16, 4).unwrap();
    let first = chunker.chunk(&doc(text)).unwrap();
    let second = chunker.chunk(&doc(text)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn chunk_ids_are_sequential_and_document_qualified() {
    let chunker = FixedSizeChunker::new(5, 0).unwrap();
    let chunks = chunker.chunk(&doc("abcdefghij")).unwrap();
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["doc_0", "doc_1"]);
    assert_eq!(chunks[0].metadata.get("chunk_index").map(String::as_str), Some("0"));
    assert!(chunks.iter().all(|c| c.document_id == "doc"));
}

#[test]
fn overlap_not_less_than_size_is_a_config_error() {
    assert!(matches!(FixedSizeChunker::new(10, 10), Err(RagError::ConfigError(_))));
    assert!(matches!(FixedSizeChunker::new(10, 12), Err(RagError::ConfigError(_))));
    assert!(matches!(TokenChunker::new(10, 10), Err(RagError::ConfigError(_))));
}

#[test]
fn zero_chunk_size_is_a_config_error() {
    assert!(matches!(FixedSizeChunker::new(0, 0), Err(RagError::ConfigError(_))));
}

#[test]
fn empty_and_whitespace_only_input_yield_no_chunks() {
    let fixed = FixedSizeChunker::new(10, 2).unwrap();
    assert!(fixed.chunk(&doc("")).unwrap().is_empty());
    assert!(fixed.chunk(&doc("  \n\t  ")).unwrap().is_empty());

    let token = TokenChunker::new(10, 0).unwrap();
    assert!(token.chunk(&doc("")).unwrap().is_empty());
    assert!(token.chunk(&doc("  \n\t  ")).unwrap().is_empty());
}

#[test]
fn fixed_window_never_splits_inside_a_code_point() {
    let text = "héllø wörld, ünïcödé tëxt with ñ and 日本語の文字が続く".repeat(3);
    let chunker = FixedSizeChunker::new(7, 2).unwrap();
    let chunks = chunker.chunk(&doc(&text)).unwrap();
    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    assert_eq!(reconstruct(&contents, 2), text);
}

#[test]
fn token_chunks_stay_within_the_token_budget() {
    let bpe = tiktoken_rs::cl100k_base().unwrap();
    let text = "Revenue grew strongly across all segments this year. \
                Cloud services led the increase, followed by productivity software.\n\n\
                Operating expenses rose more slowly than revenue. \
                Headcount was roughly flat year over year.\n\n\
                The company returned capital through dividends and buybacks. \
                Free cash flow remained robust despite higher capital expenditure.";
    let chunker = TokenChunker::new(24, 0).unwrap();
    let chunks = chunker.chunk(&doc(text)).unwrap();

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(
            bpe.encode_ordinary(&chunk.content).len() <= 24,
            "chunk exceeds token budget: {:?}",
            chunk.content
        );
    }
}

#[test]
fn token_chunker_preserves_all_text_when_separators_suffice() {
    let text = "First paragraph about revenue.\n\nSecond paragraph about expenses.\n\n\
                Third paragraph about cash flow and capital allocation decisions.";
    let chunker = TokenChunker::new(12, 0).unwrap();
    let chunks = chunker.chunk(&doc(text)).unwrap();
    let rejoined: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(rejoined, text);
}

#[test]
fn token_chunker_splits_multi_token_codepoints_without_separators() {
    // Each emoji encodes to several cl100k tokens, and the text has no
    // separators, so splitting must fall through to the last-resort rung.
    // A budget of one token forces every window edge inside a codepoint.
    let text = "🧿".repeat(40);
    let chunker = TokenChunker::new(1, 0).unwrap();
    let chunks = chunker.chunk(&doc(&text)).unwrap();

    assert!(chunks.len() > 1);
    let rejoined: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(rejoined, text);
    assert!(chunks.iter().all(|c| c.content.chars().all(|ch| ch == '🧿')));
}

#[test]
fn token_chunker_splits_separator_free_ascii_into_token_windows() {
    let text = "x".repeat(400);
    let chunker = TokenChunker::new(10, 0).unwrap();
    let chunks = chunker.chunk(&doc(&text)).unwrap();

    assert!(chunks.len() > 1);
    let rejoined: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(rejoined, text);
}

#[test]
fn token_chunker_keeps_a_short_document_whole() {
    let text = "A short note.";
    let chunker = TokenChunker::new(64, 0).unwrap();
    let chunks = chunker.chunk(&doc(text)).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, text);
}

proptest! {
    /// Fixed-window splitting loses and duplicates nothing beyond the
    /// declared overlap, for any input and any valid window.
    #[test]
    fn fixed_window_coverage_holds_for_arbitrary_input(
        text in "[a-zA-Z0-9 .,\n]{1,200}",
        chunk_size in 2usize..32,
        overlap_frac in 0usize..100,
    ) {
        // Derive a valid overlap strictly below chunk_size.
        let overlap = overlap_frac % chunk_size;
        let chunker = FixedSizeChunker::new(chunk_size, overlap).unwrap();
        let chunks = chunker.chunk(&Document::new("doc", text.clone())).unwrap();

        if text.trim().is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            prop_assert_eq!(reconstruct(&contents, overlap), text);
        }
    }
}
