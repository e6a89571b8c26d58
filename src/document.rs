//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Documents are immutable once loaded; one per ingested source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (typically the source file name).
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a new document with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new() }
    }
}

/// A segment of a [`Document`] that has not yet been embedded.
///
/// The chunk ID is derived deterministically as `{document_id}_{index}`,
/// where the index is the zero-based position assigned after splitting.
/// Attaching a vector produces an [`EmbeddedChunk`]; the two states are
/// separate types so the vector store can only ever be handed chunks that
/// carry an embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk within a collection.
    pub id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Key-value metadata inherited from the parent document plus
    /// chunk-specific fields.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A [`Chunk`] paired with its vector embedding.
///
/// Once created the embedding is never mutated; re-embedding produces a new
/// `EmbeddedChunk`, not an in-place update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedChunk {
    /// The underlying chunk.
    pub chunk: Chunk,
    /// The vector embedding for the chunk's content.
    pub embedding: Vec<f32>,
}

/// Projection options for vector store queries.
///
/// The default projection returns chunk IDs and contents only. Each flag
/// requests an additional field on the returned [`RetrievedChunk`]s.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryInclude {
    /// Include similarity scores.
    pub scores: bool,
    /// Include stored embedding vectors.
    pub embeddings: bool,
    /// Include chunk metadata.
    pub metadata: bool,
}

impl QueryInclude {
    /// Request every optional field.
    pub fn all() -> Self {
        Self { scores: true, embeddings: true, metadata: true }
    }
}

/// A chunk returned from a vector store query.
///
/// Optional fields are populated according to the [`QueryInclude`] passed
/// to the query; with the default projection only `id` and `content` are
/// set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// The stored chunk's identifier.
    pub id: String,
    /// The stored chunk's text content.
    pub content: String,
    /// Similarity score against the query (higher is more relevant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// The stored embedding vector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// The stored chunk metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}
