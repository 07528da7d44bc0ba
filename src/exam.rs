//! Exam session: an answer sheet over a question set, plus scoring.

use crate::quiz::QuestionSet;
use serde::Serialize;
use thiserror::Error;

/// Rejected answer selections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("question {index} does not exist (exam has {len} questions)")]
    OutOfRange { index: usize, len: usize },

    #[error("{option:?} is not an option for question {index}")]
    UnknownOption { index: usize, option: String },
}

/// Per-question outcome shown after submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionReview<'a> {
    pub index: usize,
    pub question: &'a str,
    pub picked: Option<&'a str>,
    pub answer: &'a str,
    pub correct: bool,
}

/// Picks held parallel to the question set.
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: QuestionSet,
    picks: Vec<Option<String>>,
}

impl ExamSession {
    /// Start a session with every question unanswered
    pub fn new(questions: QuestionSet) -> Self {
        let picks = vec![None; questions.len()];
        Self { questions, picks }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn picked(&self, index: usize) -> Option<&str> {
        self.picks.get(index).and_then(|p| p.as_deref())
    }

    /// Record a pick; it must be one of that question's options
    pub fn select(&mut self, index: usize, option: &str) -> Result<(), SelectError> {
        let len = self.questions.len();
        let question = self
            .questions
            .get(index)
            .ok_or(SelectError::OutOfRange { index, len })?;

        if !question.options.iter().any(|o| o == option) {
            return Err(SelectError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }

        self.picks[index] = Some(option.to_string());
        Ok(())
    }

    /// Record a pick by its zero-based option position
    pub fn select_position(&mut self, index: usize, position: usize) -> Result<(), SelectError> {
        let option = self
            .questions
            .get(index)
            .and_then(|q| q.options.get(position))
            .cloned()
            .ok_or(SelectError::OutOfRange {
                index,
                len: self.questions.len(),
            })?;
        self.select(index, &option)
    }

    pub fn unanswered_count(&self) -> usize {
        self.picks.iter().filter(|p| p.is_none()).count()
    }

    /// Submission is allowed only once every question has a pick
    pub fn is_complete(&self) -> bool {
        self.unanswered_count() == 0
    }

    /// Count of questions whose pick string-equals the answer
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.picks)
            .filter(|(q, pick)| pick.as_deref().is_some_and(|p| q.is_correct(p)))
            .count()
    }

    /// Score as a percentage of the question count
    pub fn percentage(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.score() as f64 * 100.0 / self.questions.len() as f64
    }

    pub fn review(&self) -> Vec<QuestionReview<'_>> {
        self.questions
            .iter()
            .zip(&self.picks)
            .enumerate()
            .map(|(index, (q, pick))| {
                let picked = pick.as_deref();
                QuestionReview {
                    index,
                    question: &q.question,
                    picked,
                    answer: &q.answer,
                    correct: picked.is_some_and(|p| q.is_correct(p)),
                }
            })
            .collect()
    }

    /// Clear every pick, keeping the questions
    pub fn reset(&mut self) {
        self.picks.iter_mut().for_each(|p| *p = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{fixtures, validate_question_set, QUESTION_COUNT};

    fn session() -> ExamSession {
        ExamSession::new(validate_question_set(&fixtures::valid_array()).unwrap())
    }

    #[test]
    fn test_new_session_is_unanswered() {
        let exam = session();
        assert_eq!(exam.unanswered_count(), QUESTION_COUNT);
        assert!(!exam.is_complete());
        assert_eq!(exam.score(), 0);
    }

    #[test]
    fn test_score_counts_exact_matches() {
        let mut exam = session();
        for index in 0..QUESTION_COUNT {
            let pick = if index < 30 { "Gamma" } else { "Alpha" };
            exam.select(index, pick).unwrap();
        }

        assert!(exam.is_complete());
        assert_eq!(exam.score(), 30);
        assert!((exam.percentage() - 75.0).abs() < f64::EPSILON);

        let review = exam.review();
        assert!(review[0].correct);
        assert!(!review[35].correct);
        assert_eq!(review[35].picked, Some("Alpha"));
        assert_eq!(review[35].answer, "Gamma");
    }

    #[test]
    fn test_select_rejects_bad_input() {
        let mut exam = session();
        assert_eq!(
            exam.select(QUESTION_COUNT, "Gamma"),
            Err(SelectError::OutOfRange { index: 40, len: 40 })
        );
        assert!(matches!(
            exam.select(0, "Omega"),
            Err(SelectError::UnknownOption { index: 0, .. })
        ));
        assert!(exam.select_position(0, 4).is_err());
    }

    #[test]
    fn test_select_position_and_change_answer() {
        let mut exam = session();
        exam.select_position(3, 0).unwrap();
        assert_eq!(exam.picked(3), Some("Alpha"));
        exam.select_position(3, 2).unwrap();
        assert_eq!(exam.picked(3), Some("Gamma"));
        assert_eq!(exam.score(), 1);
    }

    #[test]
    fn test_reset_clears_picks() {
        let mut exam = session();
        exam.select(0, "Gamma").unwrap();
        exam.reset();
        assert_eq!(exam.unanswered_count(), QUESTION_COUNT);
        assert_eq!(exam.score(), 0);
    }
}
