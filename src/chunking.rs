//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — fixed character windows with configurable overlap
//! - [`TokenChunker`] — hierarchical separator splitting measured in
//!   `cl100k_base` tokens
//!
//! Both assign chunk IDs as `{document_id}_{index}` with a zero-based index
//! in split order, and both reject `chunk_overlap >= chunk_size` at
//! construction time so splitting can never loop.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce unembedded [`Chunk`]s; embeddings are attached
/// later by the pipeline through the vector index.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document text is empty or
    /// whitespace-only.
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::ConfigError(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

fn make_chunk(document: &Document, index: usize, content: String) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_index".to_string(), index.to_string());
    Chunk {
        id: format!("{}_{index}", document.id),
        content,
        metadata,
        document_id: document.id.clone(),
    }
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// The window start advances by `chunk_size - chunk_overlap` characters per
/// step, so the trailing `chunk_overlap` characters of chunk *i* reappear at
/// the start of chunk *i + 1* and the last chunk may be shorter than
/// `chunk_size`. Windows are measured in characters, not bytes, so
/// multi-byte text never splits inside a code point.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(256, 50)?;
/// let chunks = chunker.chunk(&document)?;
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        if document.text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chars: Vec<char> = document.text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let content: String = chars[start..end].iter().collect();
            chunks.push(make_chunk(document, index, content));
            index += 1;
            start += step;
        }

        Ok(chunks)
    }
}

/// Separator ladder tried in priority order: paragraph break, line break,
/// sentence-terminal punctuation, then single spaces. Segments that still
/// exceed the chunk size after the last separator fall back to raw token
/// windows, repacked by whole characters when a window edge would land
/// inside a multi-token codepoint.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " "];

/// Splits text hierarchically by separators, measured in encoded tokens.
///
/// A candidate segment is only split further when its `cl100k_base` token
/// count exceeds `chunk_size`; adjacent segments at the same level are
/// merged greedily while the merged text stays within the budget. Overlap
/// applies at the final raw token-window fallback, where no natural
/// boundary is available.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::TokenChunker;
///
/// let chunker = TokenChunker::new(256, 0)?;
/// let chunks = chunker.chunk(&document)?;
/// ```
#[derive(Clone)]
pub struct TokenChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    bpe: Arc<CoreBPE>,
}

impl TokenChunker {
    /// Create a new `TokenChunker` with sizes measured in `cl100k_base`
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero,
    /// `chunk_overlap >= chunk_size`, or the tokenizer fails to load.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            RagError::ConfigError(format!("failed to load cl100k_base tokenizer: {e}"))
        })?;
        Ok(Self { chunk_size, chunk_overlap, bpe: Arc::new(bpe) })
    }

    fn token_len(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Last-resort split: decode fixed token windows with overlap.
    ///
    /// A window edge can land inside a codepoint that spans several tokens,
    /// in which case the window does not decode to valid UTF-8. Such text
    /// is repacked by whole characters instead, which always decodes.
    fn split_tokens(&self, text: &str) -> Vec<String> {
        let tokens = self.bpe.encode_ordinary(text);
        let step = self.chunk_size - self.chunk_overlap;
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            let end = (start + self.chunk_size).min(tokens.len());
            match self.bpe.decode(tokens[start..end].to_vec()) {
                Ok(piece) => pieces.push(piece),
                Err(_) => return self.split_chars(text),
            }
            start += step;
        }

        pieces
    }

    /// Pack whole characters greedily up to the token budget. Used when
    /// token windows cannot split the text cleanly; a single character that
    /// exceeds the budget on its own stays whole.
    fn split_chars(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();

        for ch in text.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            if !current.is_empty() && self.token_len(&candidate) > self.chunk_size {
                pieces.push(std::mem::replace(&mut current, ch.to_string()));
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            pieces.push(current);
        }

        pieces
    }

    fn split_text(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if self.token_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            return self.split_tokens(text);
        };

        let segments = split_keeping_separator(text, separator);
        if segments.len() <= 1 {
            // Separator absent from this text; try the next one.
            return self.split_text(text, rest);
        }

        let mut pieces = Vec::new();
        let mut current = String::new();

        for segment in segments {
            if current.is_empty() {
                current = segment.to_string();
                continue;
            }
            // Measure the joined text itself: BPE token counts are not
            // additive across a merge boundary.
            let mut merged = current.clone();
            merged.push_str(segment);
            if self.token_len(&merged) <= self.chunk_size {
                current = merged;
            } else {
                self.flush(current, rest, &mut pieces);
                current = segment.to_string();
            }
        }

        if !current.is_empty() {
            self.flush(current, rest, &mut pieces);
        }

        pieces
    }

    /// Emit a merged segment, recursing with the remaining separators if it
    /// still exceeds the token budget.
    fn flush(&self, segment: String, rest: &[&str], pieces: &mut Vec<String>) {
        if self.token_len(&segment) > self.chunk_size {
            pieces.extend(self.split_text(&segment, rest));
        } else {
            pieces.push(segment);
        }
    }
}

impl Chunker for TokenChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        if document.text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let pieces = self.split_text(&document.text, SEPARATORS);
        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| make_chunk(document, i, content))
            .collect())
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so that concatenating the segments reconstructs the
/// input exactly.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}
