//! Chat-completion provider abstraction.
//!
//! Trait-based so the outbound API can be swapped (OpenAI-compatible
//! backend in production, mock in tests).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CompletionConfig;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Empty completion response")]
    EmptyResponse,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one chat completion and return the assistant's text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, CompletionError>;
}

/// OpenAI-compatible chat-completions provider.
pub struct OpenAiProvider {
    config: CompletionConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: CompletionConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = user_prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(CompletionError::RateLimited);
            }

            return Err(CompletionError::ApiError(format!(
                "completion API error {}: {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::ApiError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// Canned-response provider for tests.
pub struct MockProvider {
    reply: String,
}

impl MockProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }
}
