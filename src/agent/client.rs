//! OpenAI-compatible chat client for the reasoning service

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::error::{AdvisorError, Result};

/// Sampling temperature: low, the replies must be parseable JSON
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 600;

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A reasoning service that answers a chat conversation with text
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Whether credentials are present; unconfigured services are never called
    fn is_configured(&self) -> bool;

    /// Return the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `/chat/completions`
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u8,
    http: Client,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.resolved_api_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries.max(1),
            http,
        })
    }

    async fn execute(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::ReasoningService(format!(
                "{} - {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AdvisorError::ReasoningService(format!("Failed to parse chat response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string();

        debug!("Reasoning service replied with {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if !self.is_configured() {
            return Err(AdvisorError::ReasoningService("no api key".to_string()));
        }

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            attempts += 1;

            match self.execute(messages).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!("Chat completion attempt {} failed: {}", attempts, e);
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AdvisorError::Internal("Chat completion failed with unknown error".to_string())
        }))
    }
}
