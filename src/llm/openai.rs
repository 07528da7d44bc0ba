//! OpenAI API Provider.
//!
//! Implements the `LLMProvider` trait for OpenAI's Chat Completions API
//! (or any endpoint speaking the same wire format).

use super::provider::{LLMProvider, ModelMetadata};
use super::types::{CompletionResponse, Message, Role, Usage};
use crate::config::Config;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI Provider configuration and state.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAIProvider {
    /// Build a provider from config, holding the caller's credential
    pub fn from_config(api_key: impl Into<String>, config: &Config) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.effective_temperature(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            id: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    async fn completion(&self, messages: &[Message]) -> Result<CompletionResponse, TransportError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, endpoint = %self.endpoint, "sending chat completion");

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| TransportError::Request {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "model endpoint error: {}", body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::Envelope(e.to_string()))?;

        // A missing completion becomes empty text and fails later as a JSON error
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: chat_response.usage.map(Usage::from).unwrap_or_default(),
        })
    }
}

// -----------------------------------------------------------------------------
// OpenAI DTOs (Data Transfer Objects)
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for ApiMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}
