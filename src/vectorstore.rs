//! Vector store trait for collection management and similarity search.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::document::{EmbeddedChunk, QueryInclude, RetrievedChunk};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`EmbeddedChunk`]s. The
/// trait only accepts chunks that already carry embeddings; converting
/// text to vectors is the [`VectorIndex`](crate::index::VectorIndex)
/// adapter's job, so a backend can never be handed an unembedded chunk.
///
/// Backend failures surface as
/// [`RagError::VectorStoreError`](crate::RagError::VectorStoreError);
/// operations against a collection that was never created surface as
/// [`RagError::CollectionNotFound`](crate::RagError::CollectionNotFound).
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_or_get_collection("docs", 1536, None).await?;
/// store.upsert("docs", &embedded_chunks).await?;
/// let per_query = store.query("docs", &query_embeddings, 5, &Default::default()).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection, or return it unchanged if it already
    /// exists.
    ///
    /// Idempotent: a second call with the same name keeps the existing
    /// collection, and the metadata supplied at first creation wins —
    /// later calls never overwrite it. Re-creating with a different
    /// `dimensions` is a configuration error.
    async fn create_or_get_collection(
        &self,
        name: &str,
        dimensions: usize,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<()>;

    /// Delete a named collection and all its data. No-op if absent.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Return the metadata recorded when the collection was created.
    async fn collection_metadata(&self, name: &str) -> Result<HashMap<String, String>>;

    /// Upsert chunks into a collection, keyed by chunk ID.
    ///
    /// Re-upserting an existing ID overwrites it; there is no duplication.
    /// Fails with `CollectionNotFound` if the collection does not exist —
    /// writes never auto-create collections.
    async fn upsert(&self, collection: &str, chunks: &[EmbeddedChunk]) -> Result<()>;

    /// Score every stored chunk against each query embedding independently.
    ///
    /// Returns one ranked result list per query embedding (closest first,
    /// at most `n_results` each), in query order. Merging across queries is
    /// the retriever's job, not the store's. Optional fields on the results
    /// are populated per `include`.
    ///
    /// A backend without native multi-query batching must fan out
    /// concurrently behind this signature and join the per-query lists in
    /// input order.
    async fn query(
        &self,
        collection: &str,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        include: &QueryInclude,
    ) -> Result<Vec<Vec<RetrievedChunk>>>;
}
