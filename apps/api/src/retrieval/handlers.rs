//! Axum route handlers for standalone retrieval.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::retrieval::{format_context, RetrievedPassage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub n_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub collection: String,
    pub passages: Vec<RetrievedPassage>,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}

/// GET /api/v1/collections
pub async fn handle_list_collections(
    State(state): State<AppState>,
) -> Result<Json<CollectionsResponse>, AppError> {
    let collections = state.index.list_collections().await?;
    Ok(Json(CollectionsResponse { collections }))
}

/// POST /api/v1/collections/:name/query
///
/// Returns the nearest passages and the numbered context block built from them.
pub async fn handle_query(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("query cannot be empty".to_string()));
    }
    let n = request.n_results.unwrap_or(state.config.retrieval_top_k);

    let passages = state.retriever.retrieve(&request.query, &collection, n).await?;
    let context = format_context(&passages);

    Ok(Json(QueryResponse {
        collection,
        passages,
        context,
    }))
}
