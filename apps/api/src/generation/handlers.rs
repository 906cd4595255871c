//! Axum route handlers for question answering over an indexed collection.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::PromptMode;
use crate::retrieval::{format_context, RetrievedPassage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub mode: PromptMode,
    pub n_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub collection: String,
    pub answer: String,
    /// Passages the answer was generated from.
    pub sources: Vec<RetrievedPassage>,
}

/// POST /api/v1/collections/:name/ask
///
/// Retrieves context from the collection and answers the question in the
/// requested persona (`general`, `matching` or `bias`).
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::InvalidInput("question cannot be empty".to_string()));
    }
    let n = request.n_results.unwrap_or(state.config.retrieval_top_k);

    let sources = state
        .retriever
        .retrieve(&request.question, &collection, n)
        .await?;
    let context = format_context(&sources);

    info!(
        "Answering question on '{collection}' ({:?} mode, {} passages)",
        request.mode,
        sources.len()
    );
    let answer = state
        .reports
        .answer(&request.question, &context, request.mode)
        .await?;

    Ok(Json(AskResponse {
        collection,
        answer,
        sources,
    }))
}
