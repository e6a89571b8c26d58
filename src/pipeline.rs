//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`Chunker`], an [`EmbeddingProvider`], a [`VectorStore`],
//! a [`GenerationProvider`], and an optional [`QueryExpander`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit::{RagPipeline, RagConfig, InMemoryVectorStore, TokenChunker};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .generation_provider(Arc::new(generator))
//!     .chunker(Arc::new(TokenChunker::new(256, 0)?))
//!     .build()?;
//!
//! pipeline.create_collection("docs", None).await?;
//! pipeline.ingest("docs", &document).await?;
//! let answer = pipeline.answer("docs", "What was revenue?").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, EmbeddedChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::expansion::QueryExpander;
use crate::generation::GenerationProvider;
use crate::index::VectorIndex;
use crate::retrieval::Retriever;
use crate::synthesis::AnswerSynthesizer;
use crate::vectorstore::VectorStore;

/// The RAG pipeline orchestrator.
///
/// Write path: documents are chunked, embedded, and upserted into a named
/// collection. Read path: a question is optionally expanded into several
/// queries, retrieved in one batched call, merged and deduplicated, and
/// answered from the retrieved context. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    index: Arc<VectorIndex>,
    expander: Option<Arc<dyn QueryExpander>>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Create a named collection, or get the existing one.
    ///
    /// The collection is sized to the embedding provider's dimensionality;
    /// metadata from the first creation wins.
    pub async fn create_collection(
        &self,
        name: &str,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<()> {
        self.index.create_or_get_collection(name, metadata).await.inspect_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
        })
    }

    /// Delete a named collection from the vector store.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        self.index.delete_collection(name).await
    }

    /// Ingest a single document: chunk, embed, upsert.
    ///
    /// Re-ingesting a document overwrites its chunks by ID rather than
    /// duplicating them. Returns the embedded chunks that were stored.
    ///
    /// # Errors
    ///
    /// Propagates chunking, embedding, and store errors, including
    /// `CollectionNotFound` when the collection was never created.
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<Vec<EmbeddedChunk>> {
        let chunks = self.chunker.chunk(document).inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "chunking failed during ingestion");
        })?;
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(Vec::new());
        }

        let embedded = self.index.upsert(collection, &chunks).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
        })?;

        info!(document.id = %document.id, chunk_count = embedded.len(), "ingested document");
        Ok(embedded)
    }

    /// Ingest multiple documents through the chunk, embed, upsert workflow.
    ///
    /// Returns all chunks that were stored across all documents.
    ///
    /// # Errors
    ///
    /// Fails on the first document that fails; earlier documents remain
    /// stored.
    pub async fn ingest_batch(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<Vec<EmbeddedChunk>> {
        let mut all_chunks = Vec::new();
        for document in documents {
            let chunks = self.ingest(collection, document).await?;
            all_chunks.extend(chunks);
        }
        Ok(all_chunks)
    }

    /// Retrieve the chunks most relevant to a question, without expansion
    /// or synthesis.
    pub async fn retrieve(&self, collection: &str, question: &str) -> Result<Vec<String>> {
        let queries = [question.to_string()];
        self.retriever.retrieve(&queries, collection, self.config.n_results).await
    }

    /// Answer a question from the collection: expand, retrieve, synthesize.
    ///
    /// If the configured expander fails with
    /// [`RagError::EmptyGeneration`] — the one recoverable expansion
    /// failure — the pipeline logs a warning and retrieves with the
    /// unexpanded question. Every other expansion error, and any synthesis
    /// failure, propagates to the caller.
    pub async fn answer(&self, collection: &str, question: &str) -> Result<String> {
        let queries = self.expanded_queries(question).await?;

        let chunks =
            self.retriever.retrieve(&queries, collection, self.config.n_results).await.inspect_err(
                |e| error!(collection, error = %e, "retrieval failed"),
            )?;

        let answer = self.synthesizer.synthesize(question, &chunks).await.inspect_err(|e| {
            error!(error = %e, "answer synthesis failed");
        })?;

        info!(collection, query_count = queries.len(), chunk_count = chunks.len(), "answered question");
        Ok(answer)
    }

    async fn expanded_queries(&self, question: &str) -> Result<Vec<String>> {
        let Some(expander) = &self.expander else {
            return Ok(vec![question.to_string()]);
        };

        match expander.expand(question).await {
            Ok(queries) if !queries.is_empty() => Ok(queries),
            Ok(_) => Ok(vec![question.to_string()]),
            Err(RagError::EmptyGeneration) => {
                warn!("query expansion returned no content, retrieving with the original question");
                Ok(vec![question.to_string()])
            }
            Err(e) => Err(e),
        }
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields except `query_expander` are required. Call
/// [`build()`](RagPipelineBuilder::build) to validate and produce the
/// pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .generation_provider(Arc::new(generator))
///     .chunker(Arc::new(chunker))
///     .query_expander(Arc::new(expander))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    expander: Option<Arc<dyn QueryExpander>>,
    synthesizer: Option<AnswerSynthesizer>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider bound to every collection the pipeline
    /// touches.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation provider used for answer synthesis.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set an optional query expander applied before retrieval.
    pub fn query_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Replace the default answer synthesizer, e.g. to customize its
    /// system prompt.
    pub fn synthesizer(mut self, synthesizer: AnswerSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::ConfigError("generation_provider is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;

        let index = Arc::new(VectorIndex::new(vector_store, embedding_provider));
        let retriever = Retriever::new(Arc::clone(&index));
        let synthesizer =
            self.synthesizer.unwrap_or_else(|| AnswerSynthesizer::new(generation_provider));

        Ok(RagPipeline {
            config,
            chunker,
            index,
            expander: self.expander,
            retriever,
            synthesizer,
        })
    }
}
