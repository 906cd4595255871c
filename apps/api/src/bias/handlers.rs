//! Axum route handlers for standalone bias analysis.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bias::report::format_report;
use crate::bias::scorer::{analyze, BiasReport};
use crate::errors::AppError;
use crate::ingest::upload::receive_documents;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BiasRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct BiasResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub report: BiasReport,
    pub formatted: String,
}

/// POST /api/v1/bias
///
/// Scores a posting supplied as raw text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<BiasRequest>,
) -> Result<Json<BiasResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::InvalidInput("text cannot be empty".to_string()));
    }

    let report = analyze(&state.rules, &request.text);
    let formatted = format_report(&report);

    Ok(Json(BiasResponse {
        filename: None,
        report,
        formatted,
    }))
}

/// POST /api/v1/bias/upload
///
/// Multipart field `posting` (PDF). Extracts and chunks the document, then
/// scores the re-joined text. Nothing is indexed.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BiasResponse>, AppError> {
    let mut documents = receive_documents(multipart, &["posting"]).await?;
    let posting = documents
        .remove("posting")
        .ok_or_else(|| AppError::InvalidInput("missing file field 'posting'".to_string()))?;

    let chunks = state.loader.load_and_split(posting.file.path()).await?;
    let report = analyze(&state.rules, &chunks.join(" "));
    info!(
        "Bias analysis of {}: score={}",
        posting.file_name, report.bias_score
    );
    let formatted = format_report(&report);

    Ok(Json(BiasResponse {
        filename: Some(posting.file_name),
        report,
        formatted,
    }))
}
