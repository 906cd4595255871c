use std::path::Path;

use tracing::info;

use crate::errors::AppError;

/// Reads a PDF from disk and returns its raw text.
///
/// Fails with `InvalidInput` for a non-`.pdf` path or a document with no
/// extractable text, and with `NotFound` when the path does not resolve.
pub async fn load_pdf(path: &Path) -> Result<String, AppError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(AppError::InvalidInput(format!(
            "file must be a PDF: {}",
            path.display()
        )));
    }

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(AppError::NotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }

    // pdf-extract is synchronous and CPU-bound
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| {
            AppError::InvalidInput(format!("could not read PDF {}: {e}", path.display()))
        })?;

    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(format!(
            "no text extracted from PDF: {}",
            path.display()
        )));
    }

    info!(
        "PDF loaded: {} ({} characters)",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        text.chars().count()
    );
    Ok(text)
}
