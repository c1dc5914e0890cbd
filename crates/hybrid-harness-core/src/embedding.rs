//! Embedding provider trait, vector utilities, and the embedding-backed
//! semantic scorer.
//!
//! Concrete providers (OpenAI, disabled) live in the `hybrid-harness` app
//! crate. This module only defines the seam and the pure math on top of it.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::CorpusItem;
use crate::scorer::SemanticScorer;

/// Trait for embedding providers.
///
/// Calls are synchronous; a remote provider blocks until the API answers
/// or its own retry budget is spent.
pub trait EmbeddingProvider {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts, returning one vector per input in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
pub fn embed_query(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    provider
        .embed(&[text.to_string()])?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Cosine distance, `1 - cosine_similarity`, in `[0.0, 2.0]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - f64::from(cosine_similarity(a, b))
}

/// One embedding vector per corpus item, in corpus order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    pub model: String,
    pub dims: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Embed every corpus item in batches of `batch_size`.
    ///
    /// Fails if the provider returns the wrong number of vectors or a
    /// vector whose length differs from `provider.dims()`.
    pub fn build(
        provider: &dyn EmbeddingProvider,
        corpus: &[CorpusItem],
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let dims = provider.dims();
        let mut vectors = Vec::with_capacity(corpus.len());

        for (batch_no, batch) in corpus.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|item| item.text.clone()).collect();
            let embedded = provider.embed(&texts)?;
            if embedded.len() != texts.len() {
                bail!(
                    "Embedding provider returned {} vectors for a batch of {}",
                    embedded.len(),
                    texts.len()
                );
            }
            if let Some(v) = embedded.iter().find(|v| v.len() != dims) {
                bail!(
                    "Embedding has {} dimensions, expected {} for model {}",
                    v.len(),
                    dims,
                    provider.model_name()
                );
            }
            debug!(batch = batch_no, size = texts.len(), "embedded batch");
            vectors.extend(embedded);
        }

        Ok(Self {
            model: provider.model_name().to_string(),
            dims,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine distance from `query_vec` to every stored vector.
    pub fn distances(&self, query_vec: &[f32]) -> Result<Vec<f64>> {
        if query_vec.len() != self.dims {
            bail!(
                "Query embedding has {} dimensions but the index holds {}-dimensional vectors",
                query_vec.len(),
                self.dims
            );
        }
        Ok(self
            .vectors
            .iter()
            .map(|v| cosine_distance(query_vec, v))
            .collect())
    }
}

/// [`SemanticScorer`] that embeds the query and measures cosine distance
/// to a prebuilt [`VectorIndex`].
pub struct EmbeddingScorer<'a> {
    pub provider: &'a dyn EmbeddingProvider,
    pub index: &'a VectorIndex,
}

impl SemanticScorer for EmbeddingScorer<'_> {
    fn semantic_distances(&self, query: &str, corpus: &[CorpusItem]) -> Result<Vec<f64>> {
        if corpus.len() != self.index.len() {
            bail!(
                "Vector index holds {} vectors but the corpus has {} items",
                self.index.len(),
                corpus.len()
            );
        }
        if self.provider.model_name() != self.index.model {
            bail!(
                "Vector index was built with model {} but the provider is {}",
                self.index.model,
                self.provider.model_name()
            );
        }
        let query_vec = embed_query(self.provider, query)?;
        self.index.distances(&query_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds text as letter counts over `a..=d`.
    struct LetterProvider;

    impl EmbeddingProvider for LetterProvider {
        fn model_name(&self) -> &str {
            "letters"
        }
        fn dims(&self) -> usize {
            4
        }
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 4];
                    for c in t.chars() {
                        if ('a'..='d').contains(&c) {
                            v[(c as u8 - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_empty_and_mismatched() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_build_batches() {
        let corpus: Vec<CorpusItem> = ["aa", "bb", "cc", "dd", "ab"]
            .iter()
            .map(|t| CorpusItem::new(*t))
            .collect();
        let index = VectorIndex::build(&LetterProvider, &corpus, 2).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.model, "letters");
        assert_eq!(index.vectors[4], vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scorer_distances() {
        let corpus: Vec<CorpusItem> = ["aaa", "bbb", "ab"]
            .iter()
            .map(|t| CorpusItem::new(*t))
            .collect();
        let index = VectorIndex::build(&LetterProvider, &corpus, 8).unwrap();
        let scorer = EmbeddingScorer {
            provider: &LetterProvider,
            index: &index,
        };
        let d = scorer.semantic_distances("a", &corpus).unwrap();
        assert!(d[0].abs() < 1e-6);
        assert!((d[1] - 1.0).abs() < 1e-6);
        assert!(d[2] > d[0] && d[2] < d[1]);
    }

    #[test]
    fn test_scorer_rejects_misaligned_corpus() {
        let corpus = vec![CorpusItem::new("a")];
        let index = VectorIndex::build(&LetterProvider, &corpus, 8).unwrap();
        let scorer = EmbeddingScorer {
            provider: &LetterProvider,
            index: &index,
        };
        let longer = vec![CorpusItem::new("a"), CorpusItem::new("b")];
        assert!(scorer.semantic_distances("a", &longer).is_err());
    }

    #[test]
    fn test_distances_dimension_check() {
        let index = VectorIndex {
            model: "m".into(),
            dims: 3,
            vectors: vec![vec![1.0, 0.0, 0.0]],
        };
        assert!(index.distances(&[1.0, 0.0]).is_err());
    }
}
