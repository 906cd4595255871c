//! Embedding service: turns text into vectors for the Vector Index.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("embedder returned no vector")))
    }
}

/// Embeddings served by Ollama's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    llm: LlmClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(llm: LlmClient, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        debug!("Embedding {} texts with {}", texts.len(), self.model);
        Ok(self.llm.embed(&self.model, texts).await?)
    }
}
