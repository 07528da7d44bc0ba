//! Server application state

use crate::quiz::QuizBackend;
use std::sync::Arc;

/// Shared application state for all route handlers
pub struct AppState {
    /// Generates questions on behalf of clients; holds the credential
    pub backend: Arc<dyn QuizBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self { backend }
    }
}
