//! Generation provider trait for text completion.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that turns a prompt into free text.
///
/// `complete` returns `Ok(None)` when the backend finished without
/// producing content; backends do not treat an empty completion as a
/// transport error, so callers must check for it explicitly. The
/// query-expansion and synthesis components map `None` to
/// [`RagError::EmptyGeneration`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for the given system and user prompts.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Option<String>>;
}

/// Unwrap generated content, mapping absent or whitespace-only output to
/// [`RagError::EmptyGeneration`].
pub(crate) fn require_content(content: Option<String>) -> Result<String> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RagError::EmptyGeneration),
    }
}
