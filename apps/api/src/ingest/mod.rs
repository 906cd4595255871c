//! Document ingestion: load a document from disk and cut it into chunks.

pub mod chunker;
pub mod pdf;
pub mod upload;

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::chunker::Chunker;

/// Loads one document and returns its chunks in document order.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load_and_split(&self, path: &Path) -> Result<Vec<String>, AppError>;
}

/// Default loader: PDF text extraction followed by the recursive chunker.
pub struct PdfLoader {
    chunker: Chunker,
}

impl PdfLoader {
    pub fn new(chunker: Chunker) -> Self {
        Self { chunker }
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load_and_split(&self, path: &Path) -> Result<Vec<String>, AppError> {
        let text = pdf::load_pdf(path).await?;
        let chunks = self.chunker.split(&text);
        info!(
            "Text split into {} chunks (chunk_size={}, chunk_overlap={})",
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.chunk_overlap()
        );
        if chunks.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "document is empty: {}",
                path.display()
            )));
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pdf_loader_propagates_not_found() {
        let loader = PdfLoader::new(Chunker::new(512, 50).unwrap());
        let err = loader
            .load_and_split(Path::new("cv_inexistant.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
