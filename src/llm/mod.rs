//! Completion client for the external text-completion API.
//!
//! Defines the `CompletionBackend` trait and provides the xAI Grok
//! implementation. Both the score estimator and the BI analyst go through
//! this single seam, so tests can substitute a deterministic backend.

pub mod xai;

use async_trait::async_trait;

use crate::error::BoxsightError;

/// Abstraction over text-completion backends.
///
/// Implementors send a prompt to an LLM completion endpoint and return the
/// cleaned response text. Empty text after cleanup is an error, never an
/// empty string.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion with the caller-supplied token budget and
    /// sampling temperature.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, BoxsightError>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
