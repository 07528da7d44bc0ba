//! Quiz generation: from extracted text to a validated question set.
//!
//! - `prompt`: builds the chat messages sent to the model
//! - `extract`: pulls the JSON candidate out of noisy model output
//! - `validate`: strict schema check (reject, never coerce)
//! - `generator`: direct transport through an `LLMProvider`
//! - `relay_client`: transport through the relay server

pub mod extract;
pub mod generator;
pub mod prompt;
pub mod relay_client;
pub mod validate;

pub use generator::{QuizBackend, QuizGenerator, MIN_SOURCE_CHARS};
pub use relay_client::RelayClient;
pub use validate::{parse_question_set, validate_question_set};

use serde::Serialize;

/// Number of questions in every generated exam
pub const QUESTION_COUNT: usize = 40;

/// Number of options per question
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question.
///
/// Only built by the validator, so `answer` is always one of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub answer: String,
}

impl Question {
    /// Position of the correct answer within `options`
    pub fn answer_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| *option == self.answer)
            .unwrap_or_default()
    }

    /// Whether a picked option string-equals the answer
    pub fn is_correct(&self, picked: &str) -> bool {
        picked == self.answer
    }
}

/// Exactly [`QUESTION_COUNT`] validated questions, in model order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    /// Callers go through `validate_question_set`, which checks the count
    pub(crate) fn from_validated(questions: Vec<Question>) -> Self {
        debug_assert_eq!(questions.len(), QUESTION_COUNT);
        Self(questions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_index_and_correctness() {
        let set = validate_question_set(&fixtures::valid_array()).unwrap();
        let first = set.get(0).unwrap();
        assert_eq!(first.answer_index(), 2);
        assert!(first.is_correct("Gamma"));
        assert!(!first.is_correct("gamma"));
    }

    #[test]
    fn test_question_set_serializes_as_plain_array() {
        let set = validate_question_set(&fixtures::valid_array()).unwrap();
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value, fixtures::valid_array());
        assert_eq!(set.iter().count(), QUESTION_COUNT);
    }
}
