use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
///
/// Every fallible stage of the analysis pipeline reports one of these. The
/// orchestrator catches them exactly once and turns them into a failed
/// `PipelineResult`; HTTP handlers return them directly.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing file on disk or missing vector collection.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wrong file type, empty extracted text, malformed rule set or request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("Service timeout: {0}")]
    ServiceTimeout(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unreachable { host } => AppError::ServiceUnreachable(format!(
                "cannot reach Ollama at {host}; start it with `ollama serve`"
            )),
            LlmError::Timeout { seconds } => AppError::ServiceTimeout(format!(
                "the model did not answer within {seconds}s, try again"
            )),
            other => AppError::GenerationFailed(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            AppError::ServiceUnreachable(msg) => {
                tracing::error!("Service unreachable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNREACHABLE",
                    msg.clone(),
                )
            }
            AppError::ServiceTimeout(msg) => {
                tracing::error!("Service timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "SERVICE_TIMEOUT", msg.clone())
            }
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "The language model backend returned an error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
