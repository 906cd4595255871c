use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bias::rules::BiasRuleSet;
use crate::config::Config;
use crate::generation::ReportGenerator;
use crate::index::VectorIndex;
use crate::ingest::DocumentLoader;
use crate::pipeline::Pipeline;
use crate::retrieval::ContextRetriever;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only after startup.
    pub rules: Arc<BiasRuleSet>,
    pub loader: Arc<dyn DocumentLoader>,
    pub index: Arc<dyn VectorIndex>,
    pub retriever: ContextRetriever,
    pub reports: Arc<ReportGenerator>,
    pub pipeline: Arc<Pipeline>,
    /// Held for the duration of a pipeline run; the fixed collection names
    /// allow only one run at a time.
    pub pipeline_lock: Arc<Mutex<()>>,
}
