//! Pipeline Orchestrator — the end-to-end résumé / job posting workflow.
//!
//! Five stages run strictly in order, each consuming what the previous ones
//! left in the run state: ingest, index, bias check, summarize, match. The
//! first failing stage aborts the run. Its error is recorded on the result and
//! every partial output is dropped, so callers only ever see a complete result
//! or a failed one.
//!
//! The two collections have fixed names, so two overlapping runs would clobber
//! each other's passages. Callers must serialize runs (the HTTP layer holds a
//! mutex for this).

pub mod handlers;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::bias::report::format_report;
use crate::bias::rules::BiasRuleSet;
use crate::bias::scorer::{analyze, BiasReport};
use crate::embeddings::Embedder;
use crate::errors::AppError;
use crate::generation::ReportGenerator;
use crate::index::VectorIndex;
use crate::ingest::DocumentLoader;
use crate::models::{DocumentKind, SourceMetadata};
use crate::retrieval::ContextRetriever;

pub const CV_COLLECTION: &str = "cv_current";
pub const JOB_COLLECTION: &str = "job_current";

/// Fixed retrieval queries used for both the summaries and the matching report.
pub const CV_QUERY: &str = "compétences expériences formation";
pub const JOB_QUERY: &str = "compétences requises poste missions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    Index,
    BiasCheck,
    Summarize,
    Match,
}

impl Stage {
    /// Execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Ingest,
        Stage::Index,
        Stage::BiasCheck,
        Stage::Summarize,
        Stage::Match,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Index => "index",
            Stage::BiasCheck => "bias_check",
            Stage::Summarize => "summarize",
            Stage::Match => "match",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

/// Outcome of one run. Narrative fields are empty unless `status` is `Success`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub cv_filename: String,
    pub job_filename: String,
    pub status: PipelineStatus,
    pub error: Option<String>,
    pub failed_stage: Option<Stage>,
    pub bias_report: Option<BiasReport>,
    pub formatted_bias_report: String,
    pub bias_score: f64,
    pub cv_summary: String,
    pub job_summary: String,
    pub matching_report: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}

/// Outputs accumulated by the stages of a single run.
#[derive(Default)]
struct RunState {
    cv_chunks: Vec<String>,
    job_chunks: Vec<String>,
    bias_report: Option<BiasReport>,
    cv_summary: Option<String>,
    job_summary: Option<String>,
    matching_report: Option<String>,
}

/// Everything a successful run produces.
struct Completed {
    bias_report: BiasReport,
    cv_summary: String,
    job_summary: String,
    matching_report: String,
}

impl RunState {
    fn complete(self) -> Result<Completed, AppError> {
        let missing =
            |field: &str| AppError::Internal(anyhow::anyhow!("pipeline finished without {field}"));
        Ok(Completed {
            bias_report: self.bias_report.ok_or_else(|| missing("bias report"))?,
            cv_summary: self.cv_summary.ok_or_else(|| missing("cv summary"))?,
            job_summary: self.job_summary.ok_or_else(|| missing("job summary"))?,
            matching_report: self.matching_report.ok_or_else(|| missing("matching report"))?,
        })
    }
}

pub struct Pipeline {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    retriever: ContextRetriever,
    reports: Arc<ReportGenerator>,
    rules: Arc<BiasRuleSet>,
    top_k: usize,
}

impl Pipeline {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        reports: Arc<ReportGenerator>,
        rules: Arc<BiasRuleSet>,
        top_k: usize,
    ) -> Self {
        let retriever = ContextRetriever::new(embedder.clone(), index.clone());
        Self {
            loader,
            embedder,
            index,
            retriever,
            reports,
            rules,
            top_k,
        }
    }

    /// Runs all stages for one résumé / posting pair. Never returns an error:
    /// failures are reported through `status`, `error` and `failed_stage`.
    pub async fn run(&self, cv_path: &Path, job_path: &Path) -> PipelineResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);
        self.run_stages(run_id, cv_path, job_path)
            .instrument(span)
            .await
    }

    async fn run_stages(&self, run_id: Uuid, cv_path: &Path, job_path: &Path) -> PipelineResult {
        let started_at = Utc::now();
        let mut result = PipelineResult {
            run_id,
            cv_filename: display_name(cv_path),
            job_filename: display_name(job_path),
            status: PipelineStatus::Error,
            error: None,
            failed_stage: None,
            bias_report: None,
            formatted_bias_report: String::new(),
            bias_score: 0.0,
            cv_summary: String::new(),
            job_summary: String::new(),
            matching_report: String::new(),
            started_at,
            finished_at: started_at,
        };

        info!(
            "Pipeline started: cv={} job={}",
            result.cv_filename, result.job_filename
        );

        let mut state = RunState::default();
        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            info!("Stage {}/{}: {stage}", i + 1, Stage::ALL.len());
            if let Err(e) = self.run_stage(stage, cv_path, job_path, &mut state).await {
                error!("Pipeline failed at stage {stage}: {e}");
                result.error = Some(e.to_string());
                result.failed_stage = Some(stage);
                result.finished_at = Utc::now();
                return result;
            }
        }

        match state.complete() {
            Ok(done) => {
                result.status = PipelineStatus::Success;
                result.bias_score = done.bias_report.bias_score;
                result.formatted_bias_report = format_report(&done.bias_report);
                result.bias_report = Some(done.bias_report);
                result.cv_summary = done.cv_summary;
                result.job_summary = done.job_summary;
                result.matching_report = done.matching_report;
                info!("Pipeline finished successfully");
            }
            Err(e) => {
                error!("Pipeline incomplete: {e}");
                result.error = Some(e.to_string());
            }
        }
        result.finished_at = Utc::now();
        result
    }

    async fn run_stage(
        &self,
        stage: Stage,
        cv_path: &Path,
        job_path: &Path,
        state: &mut RunState,
    ) -> Result<(), AppError> {
        match stage {
            Stage::Ingest => {
                state.cv_chunks = self.loader.load_and_split(cv_path).await?;
                state.job_chunks = self.loader.load_and_split(job_path).await?;
                info!(
                    "Ingested {} cv chunks and {} job chunks",
                    state.cv_chunks.len(),
                    state.job_chunks.len()
                );
            }
            Stage::Index => {
                self.index_document(CV_COLLECTION, DocumentKind::Cv, cv_path, &state.cv_chunks)
                    .await?;
                self.index_document(JOB_COLLECTION, DocumentKind::Job, job_path, &state.job_chunks)
                    .await?;
            }
            Stage::BiasCheck => {
                let report = analyze(&self.rules, &state.job_chunks.join(" "));
                info!("Bias score: {} ({:?})", report.bias_score, report.tier);
                state.bias_report = Some(report);
            }
            Stage::Summarize => {
                let (cv_context, job_context) = self.retrieve_contexts().await?;
                state.cv_summary = Some(self.reports.summarize(&cv_context, DocumentKind::Cv).await?);
                state.job_summary =
                    Some(self.reports.summarize(&job_context, DocumentKind::Job).await?);
            }
            Stage::Match => {
                let (cv_context, job_context) = self.retrieve_contexts().await?;
                state.matching_report = Some(
                    self.reports
                        .generate_matching_report(&cv_context, &job_context)
                        .await?,
                );
            }
        }
        Ok(())
    }

    async fn index_document(
        &self,
        collection: &str,
        kind: DocumentKind,
        path: &Path,
        chunks: &[String],
    ) -> Result<(), AppError> {
        let embeddings = self.embedder.embed(chunks).await?;
        let metadata = SourceMetadata {
            kind,
            source: path.display().to_string(),
        };
        self.index
            .store(collection, chunks, embeddings, &metadata)
            .await?;
        info!("Indexed {} chunks into '{collection}'", chunks.len());
        Ok(())
    }

    async fn retrieve_contexts(&self) -> Result<(String, String), AppError> {
        let cv_context = self
            .retriever
            .retrieve_context(CV_QUERY, CV_COLLECTION, self.top_k)
            .await?;
        let job_context = self
            .retriever
            .retrieve_context(JOB_QUERY, JOB_COLLECTION, self.top_k)
            .await?;
        Ok((cv_context, job_context))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
