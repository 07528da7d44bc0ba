//! The Provider Abstraction.
//!
//! This trait is the transport seam of the quiz generator. The OpenAI
//! client implements it; tests plug in canned providers.

use async_trait::async_trait;
use super::types::{Message, CompletionResponse};
use crate::error::TransportError;

/// Metadata about the model behind a provider.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub id: String,
    pub endpoint: String,
}

/// The core trait for LLM interactions.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the model's metadata.
    fn metadata(&self) -> ModelMetadata;

    /// Send a chat completion request.
    ///
    /// Exactly one request is made; implementations must not retry.
    async fn completion(&self, messages: &[Message]) -> Result<CompletionResponse, TransportError>;
}
