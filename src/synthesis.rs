//! Context-grounded answer synthesis.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::generation::{GenerationProvider, require_content};

const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a helpful research assistant. \
Answer the user's question based solely on the provided context. \
Be factual, comprehensive, and cite specific information from the context when possible. \
If the context doesn't contain enough information to fully answer the question, \
clearly state what information is missing. \
Do not make up information not present in the context.";

/// The context body used when retrieval produced no chunks.
///
/// The generator is still invoked and is expected to state that it cannot
/// answer, so the empty-retrieval case takes the same code path as every
/// other request.
pub const NO_CONTEXT_MARKER: &str = "No relevant context found.";

/// Builds a context-grounded prompt from retrieved chunks and produces the
/// final answer.
///
/// Each chunk is prefixed with a 1-based ordinal label (`Context 1:`,
/// `Context 2:`, ...) so the generator can cite which passage supports
/// which claim. The system prompt pins three constraints: answer only from
/// the supplied context, be explicit about missing information, and never
/// fabricate facts absent from the context.
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerationProvider>,
    system_prompt: String,
}

impl AnswerSynthesizer {
    /// Create a new synthesizer using the default system prompt.
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator, system_prompt: SYNTHESIS_SYSTEM_PROMPT.to_string() }
    }

    /// Override the system prompt, e.g. to describe the document domain.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Synthesize an answer to `question` grounded in `context_chunks`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyGeneration`](crate::RagError::EmptyGeneration)
    /// if the provider returns no content. There is no fallback at this
    /// stage.
    pub async fn synthesize(&self, question: &str, context_chunks: &[String]) -> Result<String> {
        let user_prompt = build_user_prompt(question, context_chunks);
        debug!(chunk_count = context_chunks.len(), "synthesizing answer");
        let content = self.generator.complete(&self.system_prompt, &user_prompt).await?;
        require_content(content)
    }
}

fn build_user_prompt(question: &str, context_chunks: &[String]) -> String {
    let context_text = if context_chunks.is_empty() {
        NO_CONTEXT_MARKER.to_string()
    } else {
        let mut text = String::new();
        for (i, chunk) in context_chunks.iter().enumerate() {
            if i > 0 {
                text.push_str("\n\n");
            }
            let _ = write!(text, "Context {}: {chunk}", i + 1);
        }
        text
    };

    format!(
        "Question: {question}\n\n\
         Context from retrieved documents:\n{context_text}\n\n\
         Please provide a comprehensive answer based on the context above."
    )
}
