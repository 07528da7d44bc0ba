//! LLM layer
//!
//! Everything that talks to a chat model:
//! - Provider abstraction (the pluggable transport the quiz generator uses)
//! - OpenAI-compatible chat-completions client
//! - Message and response types

pub mod types;
pub mod provider;
pub mod openai;

// Re-export key types
pub use types::{Message, Role, CompletionResponse, Usage};
pub use provider::{LLMProvider, ModelMetadata};
pub use openai::OpenAIProvider;
