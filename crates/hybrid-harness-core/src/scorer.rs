//! Relevance scorer seams.
//!
//! The search pipeline never computes relevance itself: it asks a
//! [`LexicalScorer`] and a [`SemanticScorer`] for one score per corpus item
//! and fuses the results. Production scorers are the TF-IDF index
//! ([`crate::tfidf::TfIdfIndex`]) and the embedding scorer
//! ([`crate::embedding::EmbeddingScorer`]); tests inject fixed vectors.
//!
//! Both traits must return a vector aligned by index with the `corpus`
//! slice they were given. Fusion validates the lengths, not the alignment.

use anyhow::Result;

use crate::models::CorpusItem;

/// Term-statistics relevance: higher is more relevant.
pub trait LexicalScorer {
    fn lexical_scores(&self, query: &str, corpus: &[CorpusItem]) -> Result<Vec<f64>>;
}

/// Embedding-space relevance expressed as a distance: lower is more relevant.
///
/// Distances are expected to lie roughly in `[0, 1]` so that `1 - distance`
/// is a usable similarity.
pub trait SemanticScorer {
    fn semantic_distances(&self, query: &str, corpus: &[CorpusItem]) -> Result<Vec<f64>>;
}

/// Fixed score vectors, ignoring the query.
///
/// Useful when both signals were computed elsewhere (e.g. loaded from a
/// cache) and only fusion is needed.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedScores(pub Vec<f64>);

impl LexicalScorer for PrecomputedScores {
    fn lexical_scores(&self, _query: &str, _corpus: &[CorpusItem]) -> Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}

impl SemanticScorer for PrecomputedScores {
    fn semantic_distances(&self, _query: &str, _corpus: &[CorpusItem]) -> Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}
