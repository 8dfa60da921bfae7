// src/llm/mod.rs
// LLM module exports and submodule declarations

pub mod anthropic;

use async_trait::async_trait;

use crate::error::ProviderError;

// Export the production client
pub use anthropic::AnthropicClient;

/// Seam between the gateway and the remote model service. The production
/// implementation talks to the Anthropic Messages API; tests substitute a
/// scripted fake. Implementations perform a single attempt per call — the
/// retry policy belongs to the gateway.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
