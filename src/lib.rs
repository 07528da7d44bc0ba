//! pdf-quiz: turn a PDF handout into a 40-question multiple-choice exam.
//!
//! Flow: PDF bytes → normalized text → prompt → one chat completion →
//! JSON candidate → strict validation → [`QuestionSet`] → [`ExamSession`].

pub mod config;
pub mod error;
pub mod exam;
pub mod llm;
pub mod pdf;
pub mod quiz;
pub mod server;

pub use config::Config;
pub use error::{GenerationError, ParseError, QuizError, TransportError};
pub use exam::{ExamSession, QuestionReview, SelectError};
pub use llm::{LLMProvider, OpenAIProvider};
pub use pdf::{extract_text, short_input_warning, ShortInputWarning};
pub use quiz::{
    parse_question_set, validate_question_set, Question, QuestionSet, QuizBackend, QuizGenerator,
    RelayClient, OPTION_COUNT, QUESTION_COUNT,
};
