//! Multipart uploads spooled to temporary files.
//!
//! Each uploaded document lives in a `NamedTempFile` that is deleted when the
//! value is dropped, so every exit path of a handler (including errors) cleans up.

use std::collections::HashMap;

use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

pub struct UploadedDocument {
    /// Client-supplied file name, used for display only.
    pub file_name: String,
    pub file: NamedTempFile,
}

/// Reads the named file fields from a multipart body. Unknown fields are
/// ignored; every name in `required` must be present and non-empty.
pub async fn receive_documents(
    mut multipart: Multipart,
    required: &[&str],
) -> Result<HashMap<String, UploadedDocument>, AppError> {
    let mut documents = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if !required.contains(&name.as_str()) {
            debug!("Ignoring unexpected multipart field '{name}'");
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name}.pdf"));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("failed to read field '{name}': {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidInput(format!("field '{name}' is empty")));
        }

        let file = tempfile::Builder::new()
            .prefix("fairhire-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create temp file: {e}")))?;
        tokio::fs::write(file.path(), &bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;

        documents.insert(name, UploadedDocument { file_name, file });
    }

    for name in required {
        if !documents.contains_key(*name) {
            return Err(AppError::InvalidInput(format!(
                "missing file field '{name}'"
            )));
        }
    }

    Ok(documents)
}
