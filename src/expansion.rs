//! Query expansion strategies.
//!
//! A [`QueryExpander`] turns one user question into the set of queries the
//! retriever should actually run. Two interchangeable strategies are
//! provided, both stateless and both calling the generation provider with a
//! fixed system role and the question as the sole user input:
//!
//! - [`HydeExpander`] — hypothetical-document embedding: the generator
//!   writes a plausible corpus-style answer, and the question plus that
//!   answer become a single expanded query. This bridges the vocabulary gap
//!   between question phrasing and document phrasing.
//! - [`MultiQueryExpander`] — fan-out: the generator proposes up to five
//!   related single-topic questions, retrieved alongside the original.
//!
//! Both fail with [`RagError::EmptyGeneration`](crate::RagError::EmptyGeneration)
//! when the provider returns no content; the pipeline treats that as a cue
//! to retrieve with the unexpanded question instead of aborting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::generation::{GenerationProvider, require_content};

/// A strategy that expands one question into one or more retrieval queries.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Produce the full ordered set of queries to retrieve with.
    async fn expand(&self, question: &str) -> Result<Vec<String>>;
}

const HYDE_SYSTEM_PROMPT: &str = "You are a helpful expert research assistant. \
Provide an example answer to the given question, that might be found in a \
document from the knowledge base.";

/// Hypothetical-document-embedding (HyDE) query expansion.
///
/// Expansion yields a single query: the original question, a line break,
/// and the generated hypothetical answer. Embedding that combined text is
/// closer in style to the target corpus than the bare question.
pub struct HydeExpander {
    generator: Arc<dyn GenerationProvider>,
    system_prompt: String,
}

impl HydeExpander {
    /// Create a new expander using the default system prompt.
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator, system_prompt: HYDE_SYSTEM_PROMPT.to_string() }
    }

    /// Override the system prompt, e.g. to describe the target corpus.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Generate the raw hypothetical answer for a question.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyGeneration`](crate::RagError::EmptyGeneration)
    /// if the provider returns no content.
    pub async fn hypothetical_answer(&self, question: &str) -> Result<String> {
        let content = self.generator.complete(&self.system_prompt, question).await?;
        require_content(content)
    }
}

#[async_trait]
impl QueryExpander for HydeExpander {
    async fn expand(&self, question: &str) -> Result<Vec<String>> {
        let hypothetical = self.hypothetical_answer(question).await?;
        debug!(answer_len = hypothetical.len(), "generated hypothetical answer");
        Ok(vec![format!("{question}\n{hypothetical}")])
    }
}

const MULTI_QUERY_SYSTEM_PROMPT: &str = "You are a knowledgeable research assistant. \
For the given question, propose up to five related questions to assist the user \
in finding the information they need. Provide concise, single-topic questions \
(without compounding sentences) that cover various aspects of the topic. \
Ensure each question is complete and directly related to the original inquiry. \
List each question on a separate line without numbering.";

/// The maximum number of sub-questions a [`MultiQueryExpander`] keeps.
pub const MAX_SUB_QUESTIONS: usize = 5;

/// Multi-query fan-out expansion.
///
/// Expansion yields the original question followed by the generated
/// sub-questions, in generation order. The provider may return fewer than
/// five; the list is used as-is, with no padding and no pre-retrieval
/// deduplication (duplicate retrievals collapse after the merge).
pub struct MultiQueryExpander {
    generator: Arc<dyn GenerationProvider>,
    system_prompt: String,
}

impl MultiQueryExpander {
    /// Create a new expander using the default system prompt.
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator, system_prompt: MULTI_QUERY_SYSTEM_PROMPT.to_string() }
    }

    /// Override the system prompt, e.g. to describe the target corpus.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Generate the sub-questions for a question, without the original.
    ///
    /// Raw generator output is split on line breaks; lines are trimmed and
    /// blank lines dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyGeneration`](crate::RagError::EmptyGeneration)
    /// if the provider returns no content.
    pub async fn sub_questions(&self, question: &str) -> Result<Vec<String>> {
        let content = self.generator.complete(&self.system_prompt, question).await?;
        let content = require_content(content)?;
        let queries = parse_sub_questions(&content);
        debug!(count = queries.len(), "generated sub-questions");
        Ok(queries)
    }
}

#[async_trait]
impl QueryExpander for MultiQueryExpander {
    async fn expand(&self, question: &str) -> Result<Vec<String>> {
        let mut queries = vec![question.to_string()];
        queries.extend(self.sub_questions(question).await?);
        Ok(queries)
    }
}

fn parse_sub_questions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUB_QUESTIONS)
        .map(String::from)
        .collect()
}
