//! Changelog synthesis via a text-generation capability.

pub mod client;
pub mod prompt;
pub mod retry;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::git::RawCommit;

pub use client::OpenAiClient;
pub use prompt::{SYSTEM_PROMPT, build_prompt, sanitize_for_prompt};

/// Token budget for a generated changelog.
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// A single completion exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait for the text-generation capability.
///
/// This abstraction allows mocking the completion endpoint in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Perform one completion exchange and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

/// Format the selected commits into a prompt and run one completion exchange.
///
/// No caching, no streaming, no retries beyond what the generator's client
/// already provides.
pub async fn synthesize(
    generator: &dyn TextGenerator,
    commits: &[RawCommit],
    model: &str,
    temperature: f32,
) -> Result<String, GenerationError> {
    let request = CompletionRequest {
        model: model.to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: build_prompt(commits),
        max_tokens: MAX_COMPLETION_TOKENS,
        temperature,
    };

    generator.complete(&request).await
}
