//! Quiz generator: prompt → one completion call → candidate → validation.

use super::{prompt, validate, QuestionSet};
use crate::error::{GenerationError, QuizError};
use crate::llm::LLMProvider;
use async_trait::async_trait;

/// Shortest source text accepted for generation
pub const MIN_SOURCE_CHARS: usize = 100;

/// Anything that can turn source text into a question set.
///
/// Implemented by [`QuizGenerator`] (direct, caller holds the credential)
/// and [`super::RelayClient`] (the relay holds it).
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn generate(&self, source_text: &str) -> Result<QuestionSet, QuizError>;
}

/// Generates questions by calling a chat model directly.
pub struct QuizGenerator<P> {
    provider: P,
}

impl<P: LLMProvider> QuizGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Reject text below [`MIN_SOURCE_CHARS`] characters (after trimming)
pub fn check_source_length(source_text: &str) -> Result<(), GenerationError> {
    let length = source_text.trim().chars().count();
    if length < MIN_SOURCE_CHARS {
        return Err(GenerationError::InputTooShort {
            length,
            minimum: MIN_SOURCE_CHARS,
        });
    }
    Ok(())
}

#[async_trait]
impl<P: LLMProvider> QuizBackend for QuizGenerator<P> {
    async fn generate(&self, source_text: &str) -> Result<QuestionSet, QuizError> {
        check_source_length(source_text)?;

        let model = self.provider.metadata();
        tracing::info!(
            model = %model.id,
            characters = source_text.chars().count(),
            "generating questions"
        );

        let messages = prompt::build_messages(source_text);
        let response = self.provider.completion(&messages).await?;

        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "raw model output: {}",
            response.content
        );

        match validate::parse_question_set(&response.content) {
            Ok(questions) => {
                tracing::info!(count = questions.len(), "generated questions");
                Ok(questions)
            }
            Err(err) => {
                tracing::error!(
                    "rejected model output ({}): {}",
                    err,
                    preview(&response.content)
                );
                Err(err.into())
            }
        }
    }
}

/// First few hundred characters of the raw output, for logs
fn preview(raw: &str) -> String {
    const LIMIT: usize = 500;
    match raw.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &raw[..cut]),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::llm::{CompletionResponse, Message, ModelMetadata, Role, Usage};
    use crate::quiz::{fixtures, QUESTION_COUNT};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that replays a canned reply and records what it was sent.
    struct CannedProvider {
        reply: Result<String, u16>,
        calls: AtomicUsize,
        last_messages: Mutex<Vec<Message>>,
    }

    impl CannedProvider {
        fn ok(content: impl Into<String>) -> Self {
            Self {
                reply: Ok(content.into()),
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        fn metadata(&self) -> ModelMetadata {
            ModelMetadata {
                id: "canned".to_string(),
                endpoint: "memory://".to_string(),
            }
        }

        async fn completion(&self, messages: &[Message]) -> Result<CompletionResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock().unwrap() = messages.to_vec();
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    usage: Usage::default(),
                }),
                Err(status) => Err(TransportError::Status {
                    status: *status,
                    body: "upstream exploded".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let generator = QuizGenerator::new(CannedProvider::ok(fixtures::valid_json()));
        let set = generator.generate(&fixtures::study_text()).await.unwrap();

        assert_eq!(set.len(), QUESTION_COUNT);
        assert_eq!(generator.provider().calls.load(Ordering::SeqCst), 1);

        let sent = generator.provider().last_messages.lock().unwrap().clone();
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[1].content.ends_with(&fixtures::study_text()));
    }

    #[tokio::test]
    async fn test_short_source_makes_no_call() {
        let generator = QuizGenerator::new(CannedProvider::ok(fixtures::valid_json()));
        let err = generator.generate("short").await.unwrap_err();

        assert!(matches!(
            err,
            QuizError::Generation(GenerationError::InputTooShort { length: 5, minimum: 100 })
        ));
        assert_eq!(generator.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_without_retry() {
        let generator = QuizGenerator::new(CannedProvider::failing(503));
        let err = generator.generate(&fixtures::study_text()).await.unwrap_err();

        assert!(matches!(
            err,
            QuizError::Transport(TransportError::Status { status: 503, .. })
        ));
        assert_eq!(generator.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_output_is_rejected() {
        let generator =
            QuizGenerator::new(CannedProvider::ok("Sure! ```json\n[{\"question\":\"Q\"}]\n```"));
        let err = generator.generate(&fixtures::study_text()).await.unwrap_err();

        assert!(matches!(
            err,
            QuizError::Generation(GenerationError::WrongCount { actual: 1, .. })
        ));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(600);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), 501);
        assert_eq!(preview("short"), "short");
    }
}
