//! Vector index adapter binding a store to an embedding provider.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::document::{Chunk, EmbeddedChunk, QueryInclude, RetrievedChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Text-level collection operations over a [`VectorStore`].
///
/// A `VectorIndex` binds one [`EmbeddingProvider`] to a store handle, so
/// every collection it creates, writes, and queries is interpreted with a
/// single embedding model. This is the invariant that keeps similarity
/// semantics coherent: mixing models within a collection silently corrupts
/// them, so the binding happens here, once, instead of ambiently.
///
/// Multiple independent `VectorIndex` handles over different stores or
/// providers are perfectly fine; nothing about the adapter is a singleton.
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorIndex {
    /// Create a new index over the given store and embedding provider.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Return a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Return a reference to the bound embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Create a collection (or get the existing one) sized to the bound
    /// provider's dimensionality. Metadata from the first creation wins.
    pub async fn create_or_get_collection(
        &self,
        name: &str,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<()> {
        self.store.create_or_get_collection(name, self.embedder.dimensions(), metadata).await
    }

    /// Delete a named collection and all its data.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        self.store.delete_collection(name).await
    }

    /// Embed unembedded chunks with the bound provider and upsert them.
    ///
    /// Returns the embedded chunks that were stored. Fails with
    /// `CollectionNotFound` if the collection was never created, and with
    /// [`RagError::EmbeddingError`] if the provider returns a mismatched
    /// number of vectors for the batch.
    pub async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<Vec<EmbeddedChunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embed_all(&texts).await?;

        let embedded: Vec<EmbeddedChunk> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk: chunk.clone(), embedding })
            .collect();

        self.store.upsert(collection, &embedded).await?;
        debug!(collection, chunk_count = embedded.len(), "upserted chunks");
        Ok(embedded)
    }

    /// Upsert chunks whose embeddings were computed by the caller.
    ///
    /// The store still enforces that the vectors match the collection's
    /// dimensionality.
    pub async fn upsert_embedded(&self, collection: &str, chunks: &[EmbeddedChunk]) -> Result<()> {
        self.store.upsert(collection, chunks).await
    }

    /// Embed the query texts in one batch and score them against the
    /// collection.
    ///
    /// Returns one ranked result list per query text, in input order; each
    /// list holds at most `n_results` chunks. The store scores every chunk
    /// against each query independently — merging across queries is the
    /// retriever's job.
    pub async fn query(
        &self,
        collection: &str,
        queries: &[String],
        n_results: usize,
        include: &QueryInclude,
    ) -> Result<Vec<Vec<RetrievedChunk>>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = queries.iter().map(String::as_str).collect();
        let embeddings = self.embed_all(&texts).await?;
        self.store.query(collection, &embeddings, n_results, include).await
    }

    async fn embed_all(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "batch".to_string(),
                message: format!(
                    "provider returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(embeddings)
    }
}
