//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error (invalid chunk parameters,
    /// embedding dimensionality mismatch, missing builder fields).
    ///
    /// Configuration errors are fatal and surface before any external
    /// call is made. They are never worth retrying.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A named collection does not exist in the vector store.
    ///
    /// Writes and queries never auto-create collections; callers that need
    /// resilience should call `create_or_get_collection` before first use.
    #[error("Collection '{collection}' not found")]
    CollectionNotFound {
        /// The name of the missing collection.
        collection: String,
    },

    /// The embedding provider call failed, or returned a malformed
    /// response (for example a batch with a mismatched vector count).
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation provider call failed at the transport or API level.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation provider completed successfully but returned no
    /// content.
    ///
    /// Fatal to the call that produced it. At the query-expansion stage the
    /// pipeline falls back to retrieving with the unexpanded question; at
    /// the synthesis stage there is no fallback.
    #[error("Generation provider returned no content")]
    EmptyGeneration,

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
