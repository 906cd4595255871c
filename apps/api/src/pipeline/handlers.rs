//! Axum route handler for end-to-end runs.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::ingest::upload::receive_documents;
use crate::pipeline::PipelineResult;
use crate::state::AppState;

/// POST /api/v1/pipeline
///
/// Multipart fields `cv` and `job` (PDFs). Runs are serialized: a request
/// waits for any in-flight run to finish before its own starts. A failed run
/// is still a 200 with `status: "error"`; only upload problems are HTTP errors.
pub async fn handle_run_pipeline(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PipelineResult>, AppError> {
    let mut documents = receive_documents(multipart, &["cv", "job"]).await?;
    let (Some(cv), Some(job)) = (documents.remove("cv"), documents.remove("job")) else {
        return Err(AppError::InvalidInput(
            "both 'cv' and 'job' files are required".to_string(),
        ));
    };

    let _guard = state.pipeline_lock.lock().await;
    info!("Running pipeline for {} / {}", cv.file_name, job.file_name);

    let mut result = state.pipeline.run(cv.file.path(), job.file.path()).await;
    result.cv_filename = cv.file_name;
    result.job_filename = job.file_name;

    Ok(Json(result))
}
