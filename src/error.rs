//! Error taxonomy.
//!
//! Every failure in extraction or generation is terminal for the current
//! attempt. Nothing here is retried; callers decide whether to resubmit.

use thiserror::Error;

/// PDF decode failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open PDF: {0}")]
    Open(String),

    #[error("failed to read page count: {0}")]
    PageCount(String),

    #[error("failed to decode page {page}: {reason}")]
    Page { page: usize, reason: String },

    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("I/O error while staging PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure talking to the model endpoint (or the relay).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response envelope: {0}")]
    Envelope(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// The model answered, but not with a usable question set.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("source text is too short ({length} characters, need at least {minimum})")]
    InputTooShort { length: usize, minimum: usize },

    #[error("model response is not valid JSON: {reason}")]
    InvalidJson { reason: String, raw: String },

    #[error("wrong question count: response is not a JSON array")]
    NotAnArray,

    #[error("wrong question count: expected {expected}, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("malformed question at index {index}: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("answer/options mismatch at index {index}: {answer:?} is not one of the options")]
    AnswerMismatch { index: usize, answer: String },
}

impl GenerationError {
    /// Raw model text attached to a JSON parse failure, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::InvalidJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Umbrella error for the PDF → quiz flow.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
