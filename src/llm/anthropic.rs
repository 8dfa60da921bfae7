// src/llm/anthropic.rs
// Anthropic Messages API client. One HTTP call per complete(); the gateway
// decides whether an error is worth another attempt.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::ProviderError;

use super::CompletionProvider;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    /// Build a client from model settings. Fails when `ANTHROPIC_API_KEY` is
    /// unset — callers treat that as a dead provider, not a fatal error.
    pub fn from_config(model: &ModelConfig) -> Result<Self, ProviderError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ProviderError::Auth("ANTHROPIC_API_KEY is not set".to_string()))?;

        let timeout = Duration::from_secs(model.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_base: model.api_base.trim_end_matches('/').to_string(),
            model: model.name.clone(),
            max_tokens: model.max_tokens,
            timeout,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        debug!("Sending categorization request to {}", self.model);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        match response.status().as_u16() {
            200 => {
                let message: MessageResponse = response.json().await.map_err(|e| {
                    // A 200 with an unreadable envelope is malformed output,
                    // not a transient fault.
                    ProviderError::Upstream {
                        status: 200,
                        body: format!("unreadable response body: {e}"),
                    }
                })?;
                let text = message
                    .content
                    .iter()
                    .filter(|block| block.kind == "text")
                    .map(|block| block.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                debug!("AI response: {}", text.trim());
                Ok(text.trim().to_string())
            }
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Auth(body))
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Upstream { status: code, body })
            }
        }
    }
}
