//! Score fusion for hybrid retrieval.
//!
//! Combines a lexical relevance signal and a semantic distance signal,
//! both computed externally over the same corpus, into one ranked top-k
//! list.
//!
//! # Algorithm
//!
//! 1. Validate that the corpus and both score vectors have equal length.
//! 2. Convert each semantic distance to a similarity: `1 - distance`.
//! 3. Combine: `score = α × semantic + (1 - α) × lexical`.
//! 4. Sort by score (desc), ties broken by corpus order (stable sort).
//! 5. Truncate to `top_k`.
//!
//! # Preconditions
//!
//! `1 - distance` assumes the semantic scorer reports distances roughly in
//! `[0, 1]`. No further normalization is applied: an unbounded metric such
//! as raw Euclidean distance yields negative "similarities" and skews the
//! blend toward the lexical side. Alpha is not clamped either; values
//! outside `[0, 1]` extrapolate the interpolation. Validate both upstream.
//!
//! # Example
//!
//! ```rust
//! use hybrid_harness_core::fusion::{fuse_scores, FusionParams};
//! use hybrid_harness_core::models::CorpusItem;
//!
//! let corpus = vec![CorpusItem::new("A"), CorpusItem::new("B"), CorpusItem::new("C")];
//! let hits = fuse_scores(
//!     &corpus,
//!     &[0.1, 0.9, 0.5],
//!     &[0.8, 0.2, 0.5],
//!     FusionParams { alpha: 0.5, top_k: 2 },
//! )
//! .unwrap();
//! let ranked: Vec<&str> = hits.iter().map(|h| h.item.text.as_str()).collect();
//! assert_eq!(ranked, ["B", "C"]);
//! ```

use thiserror::Error;

use crate::models::CorpusItem;

/// Errors raised by [`fuse_scores`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FusionError {
    /// The corpus and the two score vectors are not index-aligned.
    #[error(
        "dimension mismatch: corpus has {corpus} items, lexical scores {lexical}, semantic scores {semantic}"
    )]
    DimensionMismatch {
        corpus: usize,
        lexical: usize,
        semantic: usize,
    },
}

/// Fusion tuning for a single query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    /// Weight of the semantic signal: `score = α*semantic + (1-α)*lexical`.
    pub alpha: f64,
    /// Maximum number of hits to return.
    pub top_k: usize,
}

/// One ranked corpus item with its score breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit<'a> {
    /// Position of the item in the input corpus.
    pub index: usize,
    pub item: &'a CorpusItem,
    /// Fused score.
    pub score: f64,
    /// Lexical score as supplied.
    pub lexical_score: f64,
    /// `1 - distance`.
    pub semantic_similarity: f64,
}

/// Convert a semantic distance into a similarity.
#[inline]
pub fn semantic_similarity(distance: f64) -> f64 {
    1.0 - distance
}

/// Fuse lexical scores and semantic distances into a ranked top-k list.
///
/// Pure function of its inputs. An empty corpus (with empty score vectors)
/// yields an empty list rather than an error.
///
/// # Errors
///
/// [`FusionError::DimensionMismatch`] if `corpus`, `lexical_scores`, and
/// `semantic_distances` differ in length. No partial output is produced.
pub fn fuse_scores<'a>(
    corpus: &'a [CorpusItem],
    lexical_scores: &[f64],
    semantic_distances: &[f64],
    params: FusionParams,
) -> Result<Vec<FusedHit<'a>>, FusionError> {
    check_dimensions(corpus.len(), lexical_scores.len(), semantic_distances.len())?;

    if corpus.is_empty() {
        return Ok(Vec::new());
    }

    let alpha = params.alpha;
    let similarities: Vec<f64> = semantic_distances
        .iter()
        .map(|&d| semantic_similarity(d))
        .collect();
    let fused: Vec<f64> = similarities
        .iter()
        .zip(lexical_scores)
        .map(|(&s, &l)| alpha * s + (1.0 - alpha) * l)
        .collect();

    Ok(rank_top_k(&fused, params.top_k)
        .into_iter()
        .map(|i| FusedHit {
            index: i,
            item: &corpus[i],
            score: fused[i],
            lexical_score: lexical_scores[i],
            semantic_similarity: similarities[i],
        })
        .collect())
}

/// Indices of the `top_k` highest scores, best first.
///
/// Equal scores keep their original order. NaN ranks below every number.
pub fn rank_top_k(scores: &[f64], top_k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable, so equal keys stay in corpus order.
    order.sort_by(|&a, &b| rank_key(scores[b]).total_cmp(&rank_key(scores[a])));
    order.truncate(top_k);
    order
}

fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        // Folds -0.0 into 0.0 so the two compare equal under total_cmp.
        score + 0.0
    }
}

pub(crate) fn check_dimensions(
    corpus: usize,
    lexical: usize,
    semantic: usize,
) -> Result<(), FusionError> {
    if corpus != lexical || corpus != semantic {
        return Err(FusionError::DimensionMismatch {
            corpus,
            lexical,
            semantic,
        });
    }
    Ok(())
}
