//! # ragkit
//!
//! Retrieval-augmented generation core: chunking, embedding-backed
//! similarity search, multi-strategy query expansion, cross-query
//! deduplication, and context-grounded answer synthesis.
//!
//! ## Overview
//!
//! Write path: documents → [`Chunker`] → [`VectorIndex`] (embed + upsert).
//! Read path: question → [`QueryExpander`] → [`Retriever`] (batched search,
//! merge, dedup) → [`AnswerSynthesizer`] → answer. The [`RagPipeline`]
//! wires all of it together behind a builder.
//!
//! External collaborators sit behind three traits so every component can be
//! tested with doubles:
//!
//! - [`EmbeddingProvider`] — text to fixed-length vectors
//! - [`VectorStore`] — named collections with nearest-neighbor search
//! - [`GenerationProvider`] — prompt to free text
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{Document, InMemoryVectorStore, RagConfig, RagPipeline, TokenChunker};
//! use ragkit::openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .generation_provider(Arc::new(OpenAIGenerationProvider::from_env()?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(TokenChunker::new(256, 0)?))
//!     .build()?;
//!
//! pipeline.create_collection("reports", None).await?;
//! pipeline.ingest("reports", &Document::new("annual-report", text)).await?;
//! let answer = pipeline.answer("reports", "What was total revenue?").await?;
//! ```
//!
//! ## Error semantics
//!
//! Configuration problems fail before any external call; a missing
//! collection is always [`RagError::CollectionNotFound`], never an empty
//! result; provider failures propagate without internal retries; and an
//! empty generation is recoverable only at the query-expansion stage, where
//! the pipeline falls back to the unexpanded question.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod expansion;
pub mod generation;
pub mod index;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retrieval;
pub mod synthesis;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, TokenChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, EmbeddedChunk, QueryInclude, RetrievedChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use expansion::{HydeExpander, MultiQueryExpander, QueryExpander};
pub use generation::GenerationProvider;
pub use index::VectorIndex;
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retrieval::Retriever;
pub use synthesis::AnswerSynthesizer;
pub use vectorstore::VectorStore;
