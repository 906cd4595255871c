pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::bias::handlers as bias;
use crate::generation::handlers as generation;
use crate::pipeline::handlers as pipeline;
use crate::retrieval::handlers as retrieval;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Bias analysis
        .route("/api/v1/bias", post(bias::handle_analyze_text))
        .route("/api/v1/bias/upload", post(bias::handle_analyze_upload))
        // End-to-end run
        .route("/api/v1/pipeline", post(pipeline::handle_run_pipeline))
        // Collections
        .route(
            "/api/v1/collections",
            get(retrieval::handle_list_collections),
        )
        .route(
            "/api/v1/collections/:name/query",
            post(retrieval::handle_query),
        )
        .route("/api/v1/collections/:name/ask", post(generation::handle_ask))
        .layer(upload_limit)
        .with_state(state)
}
