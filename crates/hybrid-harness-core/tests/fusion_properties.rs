//! Property tests for score fusion.

use hybrid_harness_core::fusion::{fuse_scores, rank_top_k, FusionError, FusionParams};
use hybrid_harness_core::models::CorpusItem;
use proptest::prelude::*;

fn corpus_of(n: usize) -> Vec<CorpusItem> {
    (0..n).map(|i| CorpusItem::new(format!("passage {i}"))).collect()
}

/// Aligned (lexical, distance) vectors of the same non-zero length.
fn aligned_scores() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..1.0, n),
            prop::collection::vec(0.0f64..1.0, n),
        )
    })
}

proptest! {
    #[test]
    fn fused_score_is_convex_combination(
        (lex, dist) in aligned_scores(),
        alpha in 0.0f64..=1.0,
    ) {
        let corpus = corpus_of(lex.len());
        let hits = fuse_scores(&corpus, &lex, &dist, FusionParams { alpha, top_k: lex.len() }).unwrap();
        prop_assert_eq!(hits.len(), lex.len());
        for hit in &hits {
            let i = hit.index;
            let expected = alpha * (1.0 - dist[i]) + (1.0 - alpha) * lex[i];
            prop_assert!((hit.score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn output_is_sorted_and_deterministic(
        (lex, dist) in aligned_scores(),
        alpha in 0.0f64..=1.0,
        top_k in 1usize..50,
    ) {
        let corpus = corpus_of(lex.len());
        let params = FusionParams { alpha, top_k };
        let first = fuse_scores(&corpus, &lex, &dist, params).unwrap();
        let second = fuse_scores(&corpus, &lex, &dist, params).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), top_k.min(lex.len()));
        for pair in first.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].index < pair[1].index);
            }
        }
    }

    #[test]
    fn alpha_zero_ranks_by_lexical((lex, dist) in aligned_scores()) {
        let corpus = corpus_of(lex.len());
        let hits = fuse_scores(&corpus, &lex, &dist, FusionParams { alpha: 0.0, top_k: lex.len() }).unwrap();
        let fused: Vec<usize> = hits.iter().map(|h| h.index).collect();
        prop_assert_eq!(fused, rank_top_k(&lex, lex.len()));
    }

    #[test]
    fn alpha_one_ranks_by_similarity((lex, dist) in aligned_scores()) {
        let corpus = corpus_of(lex.len());
        let hits = fuse_scores(&corpus, &lex, &dist, FusionParams { alpha: 1.0, top_k: lex.len() }).unwrap();
        let sims: Vec<f64> = dist.iter().map(|d| 1.0 - d).collect();
        let fused: Vec<usize> = hits.iter().map(|h| h.index).collect();
        prop_assert_eq!(fused, rank_top_k(&sims, sims.len()));
    }

    #[test]
    fn mismatched_lengths_always_fail(n in 1usize..20, extra in 1usize..5) {
        let corpus = corpus_of(n);
        let lex = vec![0.5; n + extra];
        let dist = vec![0.5; n];
        let result = fuse_scores(&corpus, &lex, &dist, FusionParams { alpha: 0.5, top_k: n });
        prop_assert_eq!(
            result.unwrap_err(),
            FusionError::DimensionMismatch { corpus: n, lexical: n + extra, semantic: n }
        );
    }
}
