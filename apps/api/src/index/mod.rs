//! Vector Index — named collections of embedded passages.
//!
//! The pipeline only relies on the `VectorIndex` contract: storing a collection
//! replaces any previous one of the same name in a single step, and querying
//! returns the nearest passages ordered by ascending distance.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{PassageMetadata, SourceMetadata};

pub use memory::InMemoryVectorIndex;

/// A stored passage returned by a query, closest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexHit {
    /// `{collection}_chunk_{position}`
    pub id: String,
    pub text: String,
    /// Cosine distance in [0, 2]; 0 means same direction.
    pub distance: f32,
    pub metadata: PassageMetadata,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replaces the whole collection `collection` with `chunks`. Readers see
    /// either the previous contents or the new ones, never a mix.
    async fn store(
        &self,
        collection: &str,
        chunks: &[String],
        embeddings: Vec<Vec<f32>>,
        metadata: &SourceMetadata,
    ) -> Result<(), AppError>;

    /// Returns up to `k` passages (clamped to the collection size).
    /// Unknown collections fail with `NotFound`, naming the known ones.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<IndexHit>, AppError>;

    async fn list_collections(&self) -> Result<Vec<String>, AppError>;
}

pub fn passage_id(collection: &str, position: usize) -> String {
    format!("{collection}_chunk_{position}")
}
