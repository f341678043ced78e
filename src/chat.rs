//! Client for OpenAI-compatible chat-completion endpoints.
//!
//! Sends the whole conversation in one request and returns the complete
//! answer; tokens are not streamed.
//!
//! # Retry Strategy
//!
//! | Outcome | Action |
//! |---------|--------|
//! | 2xx | parse `choices[0].message.content` |
//! | 429, 5xx | retry with exponential backoff (1s, 2s, 4s, ... capped at 32s) |
//! | other 4xx | fail immediately |
//! | network error | retry |

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ChatConfig;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API key not set: export {0}")]
    MissingApiKey(String),
    #[error("chat API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid chat response: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    fn is_retryable(&self) -> bool {
        match self {
            ChatError::Status { status, .. } => *status == 429 || *status >= 500,
            ChatError::Http(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl ChatClient {
    /// Build a client, reading the bearer token from `config.api_key_env`.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ChatError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ChatConfig, api_key: String) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    /// Send `messages` and return the assistant's reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&body).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(attempt, error = %e, "chat request failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, body: &CompletionRequest<'_>) -> Result<String, ChatError> {
        debug!(endpoint = %self.endpoint, model = %self.model, "sending chat completion");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_completion(&text)
    }
}

/// Extract `choices[0].message.content` from a completion response body.
fn parse_completion(body: &str) -> Result<String, ChatError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::InvalidResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ChatError::InvalidResponse("no choices".to_string()))
}
