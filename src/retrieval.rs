//! Retrieval across one or more expanded queries.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::document::QueryInclude;
use crate::error::Result;
use crate::index::VectorIndex;

/// Retrieves chunk contents for a set of queries and merges the results.
///
/// All queries go to the store in one batched call; the store returns one
/// ranked list per query, each capped at `n_results`. The retriever
/// flattens those lists in query order and deduplicates by exact content
/// equality, keeping each chunk at its first-seen position. The merged
/// sequence may therefore be longer than `n_results` — deduplication
/// operates over the union and never re-truncates.
pub struct Retriever {
    index: Arc<VectorIndex>,
}

impl Retriever {
    /// Create a retriever over the given index.
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }

    /// Retrieve unique chunk contents for the given queries.
    ///
    /// Returns an empty sequence when the collection exists but holds no
    /// chunks. A missing collection is an error
    /// ([`RagError::CollectionNotFound`](crate::RagError::CollectionNotFound)),
    /// never an empty result.
    pub async fn retrieve(
        &self,
        queries: &[String],
        collection: &str,
        n_results: usize,
    ) -> Result<Vec<String>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let per_query =
            self.index.query(collection, queries, n_results, &QueryInclude::default()).await?;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for results in per_query {
            for chunk in results {
                if seen.insert(chunk.content.clone()) {
                    merged.push(chunk.content);
                }
            }
        }

        debug!(
            collection,
            query_count = queries.len(),
            chunk_count = merged.len(),
            "retrieved chunks"
        );
        Ok(merged)
    }
}
