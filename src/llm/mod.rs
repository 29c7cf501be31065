//! LLM integration module.
//!
//! The indexer only needs "prompt in, text out". That seam is the
//! [`TextGenerator`] trait; [`LlmClient`] implements it against an
//! OpenAI-compatible endpoint and [`FnGenerator`] adapts any async closure.

mod client;
mod prompts;

pub use client::LlmClient;
pub use prompts::Prompts;

use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// Something that turns a prompt into generated text.
///
/// Retries, timeouts and rate limiting are the implementor's concern.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Adapter exposing an async closure as a [`TextGenerator`].
pub struct FnGenerator<F>(pub F);

#[async_trait]
impl<F, Fut> TextGenerator for FnGenerator<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    async fn generate(&self, prompt: &str) -> Result<String> {
        (self.0)(prompt.to_string()).await
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}
