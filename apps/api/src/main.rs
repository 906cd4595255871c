mod bias;
mod config;
mod embeddings;
mod errors;
mod generation;
mod index;
mod ingest;
mod llm_client;
mod models;
mod pipeline;
mod retrieval;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bias::rules::BiasRuleSet;
use crate::config::Config;
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::generation::ReportGenerator;
use crate::index::{InMemoryVectorIndex, VectorIndex};
use crate::ingest::chunker::Chunker;
use crate::ingest::{DocumentLoader, PdfLoader};
use crate::llm_client::LlmClient;
use crate::pipeline::Pipeline;
use crate::retrieval::ContextRetriever;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FairHire API v{}", env!("CARGO_PKG_VERSION"));

    // Bias rules (built-in French set unless BIAS_RULES_PATH overrides it)
    let rules = Arc::new(BiasRuleSet::load(config.bias_rules_path.as_deref()).await?);
    info!(
        "Bias rules loaded: {} categories, {} patterns",
        rules.categories().len(),
        rules.patterns().len()
    );

    // Ollama client shared by generation and embeddings
    let llm = LlmClient::new(config.ollama_host.clone(), config.generation_timeout)?;
    info!(
        "LLM client initialized (host: {}, model: {}, embeddings: {})",
        llm.host(),
        config.ollama_model,
        config.embedding_model
    );

    let embedder: Arc<dyn Embedder> =
        Arc::new(OllamaEmbedder::new(llm.clone(), config.embedding_model.clone()));
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let loader: Arc<dyn DocumentLoader> = Arc::new(PdfLoader::new(Chunker::new(
        config.chunk_size,
        config.chunk_overlap,
    )?));
    let reports = Arc::new(ReportGenerator::new(
        Arc::new(llm),
        config.ollama_model.clone(),
        config.temperature,
        config.top_p,
    ));

    let pipeline = Arc::new(Pipeline::new(
        loader.clone(),
        embedder.clone(),
        index.clone(),
        reports.clone(),
        rules.clone(),
        config.retrieval_top_k,
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        rules,
        loader,
        index: index.clone(),
        retriever: ContextRetriever::new(embedder, index),
        reports,
        pipeline,
        pipeline_lock: Arc::new(Mutex::new(())),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
