//! Context Retriever — nearest passages for a query, rendered as a numbered
//! context block for the Report Generator.

pub mod handlers;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embeddings::Embedder;
use crate::errors::AppError;
use crate::index::VectorIndex;
use crate::models::PassageMetadata;

/// A passage copied out of the index for one query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    /// `1 - distance`, in [0, 1], rounded to 4 decimals. 1 means identical.
    pub score: f64,
    pub metadata: PassageMetadata,
}

#[derive(Clone)]
pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Top-`n` passages of `collection` for `query`, most similar first.
    pub async fn retrieve(
        &self,
        query: &str,
        collection: &str,
        n: usize,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        // fail on a missing collection before paying for an embedding call
        let known = self.index.list_collections().await?;
        if !known.iter().any(|name| name == collection) {
            return Err(AppError::NotFound(format!(
                "collection '{collection}' not found; available collections: [{}]",
                known.join(", ")
            )));
        }

        let query_vector = self.embedder.embed_one(query).await?;
        let hits = self.index.query(collection, &query_vector, n).await?;

        let passages: Vec<RetrievedPassage> = hits
            .into_iter()
            .map(|hit| RetrievedPassage {
                text: hit.text,
                score: similarity(hit.distance),
                metadata: hit.metadata,
            })
            .collect();

        debug!("{} passages found for '{query}' in '{collection}'", passages.len());
        for (i, p) in passages.iter().enumerate() {
            debug!(
                "  [{}] score={} | {}",
                i + 1,
                p.score,
                p.text.chars().take(80).collect::<String>()
            );
        }

        Ok(passages)
    }

    /// `retrieve` followed by `format_context`.
    pub async fn retrieve_context(
        &self,
        query: &str,
        collection: &str,
        n: usize,
    ) -> Result<String, AppError> {
        let passages = self.retrieve(query, collection, n).await?;
        Ok(format_context(&passages))
    }
}

/// Renders passages as `[Extract i]\n<text>\n\n` blocks in result order,
/// with trailing whitespace trimmed.
pub fn format_context(passages: &[RetrievedPassage]) -> String {
    let mut context = String::new();
    for (i, passage) in passages.iter().enumerate() {
        context.push_str(&format!("[Extract {}]\n{}\n\n", i + 1, passage.text));
    }
    context.trim_end().to_string()
}

fn similarity(distance: f32) -> f64 {
    let score = (1.0 - distance as f64).clamp(0.0, 1.0);
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::index::InMemoryVectorIndex;
    use crate::models::{DocumentKind, SourceMetadata};

    /// Letter-frequency vectors: deterministic and similar for similar words.
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 26];
                    for c in t.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                        v[(c as u8 - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    /// Fails every call; proves an unknown collection is rejected before embedding.
    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Err(AppError::ServiceUnreachable("embedder down".to_string()))
        }
    }

    async fn retriever_with(embedder: Arc<dyn Embedder>) -> ContextRetriever {
        let index = Arc::new(InMemoryVectorIndex::new());
        let chunks: Vec<String> = [
            "Développeur Python avec 5 ans d'expérience.",
            "Compétences Docker, AWS et déploiement cloud.",
            "Formation Master informatique Bordeaux.",
            "Expérience en machine learning et MLflow.",
            "Recherche poste ML Engineer Paris.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let embeddings = LetterEmbedder.embed(&chunks).await.unwrap();
        index
            .store(
                "test_retriever_unit",
                &chunks,
                embeddings,
                &SourceMetadata {
                    kind: DocumentKind::Cv,
                    source: "cv.pdf".to_string(),
                },
            )
            .await
            .unwrap();
        ContextRetriever::new(embedder, index)
    }

    fn passage(text: &str) -> RetrievedPassage {
        RetrievedPassage {
            text: text.to_string(),
            score: 0.5,
            metadata: PassageMetadata {
                kind: DocumentKind::Job,
                source: "job.pdf".to_string(),
                chunk_index: 0,
            },
        }
    }

    #[tokio::test]
    async fn test_retrieve_returns_scored_results() {
        let retriever = retriever_with(Arc::new(LetterEmbedder)).await;
        let results = retriever
            .retrieve("compétences Python", "test_retriever_unit", 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        for r in &results {
            assert!((0.0..=1.0).contains(&r.score));
            assert_eq!(r.metadata.kind, DocumentKind::Cv);
        }
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_retrieve_exact_text_scores_one() {
        let retriever = retriever_with(Arc::new(LetterEmbedder)).await;
        let results = retriever
            .retrieve(
                "Formation Master informatique Bordeaux.",
                "test_retriever_unit",
                1,
            )
            .await
            .unwrap();
        assert_eq!(results[0].text, "Formation Master informatique Bordeaux.");
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_retrieve_unknown_collection_is_not_found() {
        let retriever = retriever_with(Arc::new(DownEmbedder)).await;
        let err = retriever
            .retrieve("test", "collection_inexistante", 3)
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("collection_inexistante")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_context_is_formatted() {
        let retriever = retriever_with(Arc::new(LetterEmbedder)).await;
        let context = retriever
            .retrieve_context("formation", "test_retriever_unit", 3)
            .await
            .unwrap();
        assert!(context.starts_with("[Extract 1]\n"));
    }

    #[test]
    fn test_format_context_numbers_extracts_in_order() {
        let passages: Vec<_> = ["un", "deux", "trois", "quatre"]
            .iter()
            .map(|t| passage(t))
            .collect();
        let context = format_context(&passages);

        let mut last = 0;
        for i in 1..=passages.len() {
            let marker = format!("[Extract {i}]");
            assert_eq!(context.matches(&marker).count(), 1);
            let pos = context.find(&marker).unwrap();
            assert!(pos >= last);
            last = pos;
        }
        assert!(!context.contains("[Extract 5]"));
        assert!(context.ends_with("quatre"));
    }

    #[test]
    fn test_format_context_exact_shape() {
        let context = format_context(&[passage("Python dev"), passage("Docker")]);
        assert_eq!(context, "[Extract 1]\nPython dev\n\n[Extract 2]\nDocker");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_similarity_is_clamped_and_rounded() {
        assert_eq!(similarity(0.0), 1.0);
        assert_eq!(similarity(1.5), 0.0);
        assert_eq!(similarity(0.123456), 0.8765);
    }
}
