//! Relay server
//!
//! Forwards extracted text to the model on behalf of browser clients so
//! the API key never leaves the server.
//!
//! Endpoints:
//!   POST /api/generate-questions  {text}       -> {questions} | {error}
//!   POST /api/extract             {pdf_base64} -> {text, characters, warning?}
//!   GET  /health

pub mod state;

pub use state::AppState;

use crate::error::{GenerationError, QuizError};
use crate::pdf::{self, ShortInputWarning};
use crate::quiz::generator::check_source_length;
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Upload limit for JSON bodies (base64 PDFs included)
const BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

const SHORT_TEXT_MESSAGE: &str = "PDF text is too short to generate meaningful questions";

/// Sent instead of the upstream reply, which stays in the server log
const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to generate questions with the model provider";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub pdf_base64: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ShortInputWarning>,
}

type ApiResponse = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "error": message.into() })))
}

/// Map a flow error onto an HTTP status
fn status_for(err: &QuizError) -> StatusCode {
    match err {
        QuizError::Generation(GenerationError::InputTooShort { .. }) => StatusCode::BAD_REQUEST,
        QuizError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        QuizError::Transport(_) => StatusCode::BAD_GATEWAY,
        QuizError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Open-origin CORS; preflight requests are answered by the layer
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// Build the relay router
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/generate-questions", post(generate_questions))
        .route("/extract", post(extract));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .with_state(state)
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

#[tracing::instrument(skip_all)]
async fn generate_questions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("rejected request body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let text = payload.text.unwrap_or_default();
    if check_source_length(&text).is_err() {
        tracing::warn!(characters = text.chars().count(), "text below minimum length");
        return error_response(StatusCode::BAD_REQUEST, SHORT_TEXT_MESSAGE);
    }

    tracing::info!(characters = text.chars().count(), "generating questions from text");

    match state.backend.generate(&text).await {
        Ok(questions) => (StatusCode::OK, Json(json!({ "questions": questions }))),
        Err(err @ QuizError::Transport(_)) => {
            tracing::error!("model provider request failed: {}", err);
            error_response(status_for(&err), UPSTREAM_FAILURE_MESSAGE)
        }
        Err(err) => {
            tracing::error!("generation failed: {}", err);
            error_response(status_for(&err), err.to_string())
        }
    }
}

#[tracing::instrument(skip_all)]
async fn extract(payload: Result<Json<ExtractRequest>, JsonRejection>) -> ApiResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let result = tokio::task::spawn_blocking(move || pdf::extract_text_from_base64(&payload.pdf_base64)).await;

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            tracing::warn!("PDF extraction failed: {}", err);
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string());
        }
        Err(err) => {
            tracing::error!("extraction task failed: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "extraction task failed");
        }
    };

    let response = ExtractResponse {
        characters: text.chars().count(),
        warning: pdf::short_input_warning(&text),
        text,
    };
    (StatusCode::OK, Json(json!(response)))
}

/// Run the relay on the given port
pub async fn run_server(state: Arc<AppState>, port: u16) -> Result<()> {
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::error!("port {} is already in use; try `pdf-quiz serve --port <PORT>`", port);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("relay listening on http://localhost:{}", port);
    tracing::info!("  GET    /health");
    tracing::info!("  POST   /api/generate-questions");
    tracing::info!("  POST   /api/extract");

    axum::serve(listener, app).await?;
    Ok(())
}
