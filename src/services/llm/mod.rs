//! Ollama Chat Client
//!
//! Thin single-shot wrapper around the local Ollama server's /api/chat
//! endpoint. Carries no conversation state of its own; the memory layer
//! decides what goes into each request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Default Ollama API endpoint
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Upper bound on a single chat/summarization call
const CHAT_TIMEOUT: Duration = Duration::from_secs(600);

/// One message in a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Client for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client against the default local endpoint
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(OLLAMA_DEFAULT_URL)
    }

    /// Create a client against a specific endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .build()
            .map_err(|e| AppError::llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send one non-streaming chat request and return the reply text
    pub async fn chat(&self, model: &str, messages: &[ChatMessage]) -> AppResult<String> {
        let body = OllamaChatRequest {
            model,
            messages,
            stream: false,
        };

        let resp = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::llm(format!(
                "Ollama returned {}: {}",
                status, text
            )));
        }

        let data: OllamaChatResponse = resp.json().await?;
        Ok(data.message.content)
    }
}
