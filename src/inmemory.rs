//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and small-scale use cases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{EmbeddedChunk, QueryInclude, RetrievedChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A named collection's contents: creation-time metadata, the embedding
/// dimensionality it is locked to, and chunks keyed by ID.
#[derive(Debug, Default)]
struct CollectionData {
    dimensions: usize,
    metadata: HashMap<String, String>,
    chunks: HashMap<String, EmbeddedChunk>,
}

/// An in-memory vector store using cosine similarity for search.
///
/// Collections are stored as nested `HashMap`s: collection name → chunk ID
/// → chunk. All operations are async-safe via `tokio::sync::RwLock`. Each
/// collection is locked to the dimensionality given at creation; upserts
/// and queries with a different vector length fail with a configuration
/// error instead of silently corrupting similarity semantics.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_or_get_collection("docs", 1536, None).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(collection: &str) -> RagError {
    RagError::CollectionNotFound { collection: collection.to_string() }
}

fn check_dimensions(collection: &str, expected: usize, actual: usize, what: &str) -> Result<()> {
    if expected != actual {
        return Err(RagError::ConfigError(format!(
            "{what} has {actual} dimensions but collection '{collection}' expects {expected}"
        )));
    }
    Ok(())
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_or_get_collection(
        &self,
        name: &str,
        dimensions: usize,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            // Idempotent: keep the existing collection; first metadata wins.
            return check_dimensions(name, existing.dimensions, dimensions, "create request");
        }
        collections.insert(
            name.to_string(),
            CollectionData {
                dimensions,
                metadata: metadata.unwrap_or_default(),
                chunks: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn collection_metadata(&self, name: &str) -> Result<HashMap<String, String>> {
        let collections = self.collections.read().await;
        let data = collections.get(name).ok_or_else(|| not_found(name))?;
        Ok(data.metadata.clone())
    }

    async fn upsert(&self, collection: &str, chunks: &[EmbeddedChunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| not_found(collection))?;
        for chunk in chunks {
            check_dimensions(
                collection,
                data.dimensions,
                chunk.embedding.len(),
                "upserted chunk embedding",
            )?;
            data.chunks.insert(chunk.chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        include: &QueryInclude,
    ) -> Result<Vec<Vec<RetrievedChunk>>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| not_found(collection))?;

        let mut per_query = Vec::with_capacity(query_embeddings.len());
        for embedding in query_embeddings {
            check_dimensions(collection, data.dimensions, embedding.len(), "query embedding")?;

            let mut scored: Vec<(f32, &EmbeddedChunk)> = data
                .chunks
                .values()
                .map(|chunk| (cosine_similarity(&chunk.embedding, embedding), chunk))
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(n_results);

            per_query.push(
                scored
                    .into_iter()
                    .map(|(score, chunk)| RetrievedChunk {
                        id: chunk.chunk.id.clone(),
                        content: chunk.chunk.content.clone(),
                        score: include.scores.then_some(score),
                        embedding: include.embeddings.then(|| chunk.embedding.clone()),
                        metadata: include.metadata.then(|| chunk.chunk.metadata.clone()),
                    })
                    .collect(),
            );
        }

        Ok(per_query)
    }
}
