use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::index::{passage_id, IndexHit, VectorIndex};
use crate::models::{PassageMetadata, SourceMetadata};

#[derive(Debug, Clone)]
struct StoredPassage {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: PassageMetadata,
}

#[derive(Debug, Default)]
struct Collection {
    dimension: usize,
    passages: Vec<StoredPassage>,
}

/// Process-local index with brute-force cosine search.
///
/// A collection is fully built before it is swapped into the map under the
/// write lock, which is what makes re-indexing atomic.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn store(
        &self,
        collection: &str,
        chunks: &[String],
        embeddings: Vec<Vec<f32>>,
        metadata: &SourceMetadata,
    ) -> Result<(), AppError> {
        if collection.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "collection name cannot be empty".to_string(),
            ));
        }
        if chunks.len() != embeddings.len() {
            return Err(AppError::InvalidInput(format!(
                "got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if embeddings.iter().any(|e| e.len() != dimension) {
            return Err(AppError::InvalidInput(
                "embeddings have inconsistent dimensions".to_string(),
            ));
        }

        let passages = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (text, embedding))| StoredPassage {
                id: passage_id(collection, position),
                text: text.clone(),
                embedding,
                metadata: PassageMetadata {
                    kind: metadata.kind,
                    source: metadata.source.clone(),
                    chunk_index: position,
                },
            })
            .collect::<Vec<_>>();

        let count = passages.len();
        let replaced = self
            .collections
            .write()
            .await
            .insert(
                collection.to_string(),
                Collection {
                    dimension,
                    passages,
                },
            )
            .is_some();

        if replaced {
            info!("Replaced existing collection '{collection}'");
        }
        info!("{count} vectors stored in collection '{collection}'");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<IndexHit>, AppError> {
        let collections = self.collections.read().await;

        let Some(stored) = collections.get(collection) else {
            let mut known: Vec<&str> = collections.keys().map(String::as_str).collect();
            known.sort_unstable();
            return Err(AppError::NotFound(format!(
                "collection '{collection}' not found; available collections: [{}]",
                known.join(", ")
            )));
        };

        if stored.passages.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if embedding.len() != stored.dimension {
            return Err(AppError::InvalidInput(format!(
                "query embedding has dimension {}, collection '{collection}' expects {}",
                embedding.len(),
                stored.dimension
            )));
        }

        let mut hits: Vec<IndexHit> = stored
            .passages
            .iter()
            .map(|p| IndexHit {
                id: p.id.clone(),
                text: p.text.clone(),
                distance: cosine_distance(embedding, &p.embedding),
                metadata: p.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k.min(stored.passages.len()));
        Ok(hits)
    }

    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
