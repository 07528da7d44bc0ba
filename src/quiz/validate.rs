//! Strict schema validation of model output.
//!
//! Pure functions over text and `serde_json::Value`, independent of any
//! transport. Anything that does not match the schema exactly is rejected.

use super::extract;
use super::{Question, QuestionSet, OPTION_COUNT, QUESTION_COUNT};
use crate::error::GenerationError;
use serde_json::Value;

/// Extract the JSON candidate from raw model text, parse it, validate it
pub fn parse_question_set(raw: &str) -> Result<QuestionSet, GenerationError> {
    let candidate = extract::candidate(raw);
    let value: Value = serde_json::from_str(candidate).map_err(|e| GenerationError::InvalidJson {
        reason: e.to_string(),
        raw: raw.to_string(),
    })?;
    validate_question_set(&value)
}

/// Validate an already-parsed value as a full question set
pub fn validate_question_set(value: &Value) -> Result<QuestionSet, GenerationError> {
    let items = value.as_array().ok_or(GenerationError::NotAnArray)?;

    if items.len() != QUESTION_COUNT {
        return Err(GenerationError::WrongCount {
            expected: QUESTION_COUNT,
            actual: items.len(),
        });
    }

    let questions = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_question(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuestionSet::from_validated(questions))
}

fn validate_question(index: usize, item: &Value) -> Result<Question, GenerationError> {
    let malformed = |reason: &str| GenerationError::Malformed {
        index,
        reason: reason.to_string(),
    };

    let object = item.as_object().ok_or_else(|| malformed("not a JSON object"))?;

    let question = object
        .get("question")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("\"question\" must be a non-empty string"))?;

    let options = object
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("\"options\" must be an array"))?;
    if options.len() != OPTION_COUNT {
        return Err(malformed(&format!(
            "\"options\" must hold exactly {} entries, found {}",
            OPTION_COUNT,
            options.len()
        )));
    }
    let options: Vec<String> = options
        .iter()
        .map(|option| option.as_str().map(str::to_string))
        .collect::<Option<_>>()
        .ok_or_else(|| malformed("every option must be a string"))?;
    let options: [String; OPTION_COUNT] = options
        .try_into()
        .map_err(|_| malformed("\"options\" has the wrong length"))?;

    let answer = object
        .get("answer")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("\"answer\" must be a string"))?;

    if !options.iter().any(|option| option == answer) {
        return Err(GenerationError::AnswerMismatch {
            index,
            answer: answer.to_string(),
        });
    }

    Ok(Question {
        question: question.to_string(),
        options,
        answer: answer.to_string(),
    })
}
