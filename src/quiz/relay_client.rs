//! Client side of the relay: the credential stays on the server.

use super::generator::QuizBackend;
use super::{validate, QuestionSet};
use crate::error::{QuizError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Sends extracted text to a relay and validates what comes back.
pub struct RelayClient {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RelaySuccess {
    questions: Value,
}

#[derive(Deserialize)]
struct RelayFailure {
    error: String,
}

impl RelayClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuizBackend for RelayClient {
    async fn generate(&self, source_text: &str) -> Result<QuestionSet, QuizError> {
        tracing::info!(relay = %self.url, "requesting questions from relay");

        let response = self.client
            .post(&self.url)
            .json(&RelayRequest { text: source_text })
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| TransportError::Request {
            endpoint: self.url.clone(),
            source,
        })?;

        if !status.is_success() {
            // Prefer the relay's own message over the raw body
            let detail = serde_json::from_str::<RelayFailure>(&body)
                .map(|failure| failure.error)
                .unwrap_or(body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: detail,
            }
            .into());
        }

        let success: RelaySuccess = serde_json::from_str(&body)
            .map_err(|e| TransportError::Envelope(e.to_string()))?;

        // The relay validates too, but never trust the wire
        Ok(validate::validate_question_set(&success.questions)?)
    }
}
