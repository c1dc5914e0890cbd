//! Search engine with keyword, semantic, and hybrid retrieval modes.
//!
//! The search algorithm operates entirely through the [`LexicalScorer`] and
//! [`SemanticScorer`] traits, with no filesystem or configuration
//! dependencies. The calling application is responsible for building the
//! scorers and constructing the [`SearchRequest`].
//!
//! | Mode | Signal | Effective α |
//! |------|--------|-------------|
//! | `keyword` | TF-IDF cosine only | 0.0 |
//! | `semantic` | `1 - distance` only | 1.0 |
//! | `hybrid` | [`fuse_scores`] | request α |

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::fusion::{
    check_dimensions, fuse_scores, rank_top_k, semantic_similarity, FusionParams,
};
use crate::models::CorpusItem;
use crate::scorer::{LexicalScorer, SemanticScorer};

/// Retrieval mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

impl SearchMode {
    /// Whether the mode needs a semantic scorer.
    pub fn needs_embeddings(self) -> bool {
        !matches!(self, SearchMode::Keyword)
    }
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keyword" | "tfidf" => Ok(SearchMode::Keyword),
            "semantic" => Ok(SearchMode::Semantic),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => bail!(
                "Unknown search mode: {}. Use keyword, semantic, or hybrid.",
                other
            ),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Bundles all inputs for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub mode: SearchMode,
    /// Alpha is only read in hybrid mode.
    pub params: FusionParams,
    /// If true, populate [`ScoreExplanation`] on each result.
    pub explain: bool,
}

/// One ranked passage.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    /// 1-based rank.
    pub rank: usize,
    /// Position in the corpus.
    pub index: usize,
    pub score: f64,
    pub text: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ScoreExplanation>,
}

/// Scoring breakdown for a search result.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreExplanation {
    /// 0.0 in semantic mode, where the lexical scorer is not consulted.
    pub lexical_score: f64,
    /// `1 - distance`; 0.0 in keyword mode.
    pub semantic_similarity: f64,
    /// The alpha weight used: `score = α*semantic + (1-α)*lexical`.
    pub alpha: f64,
}

/// Rank `corpus` for `req.query`.
///
/// A blank query yields no results. Semantic and hybrid modes fail when
/// `semantic` is `None`. Score vectors of the wrong length fail with the
/// fusion [`DimensionMismatch`](crate::fusion::FusionError::DimensionMismatch).
pub fn search(
    corpus: &[CorpusItem],
    lexical: &dyn LexicalScorer,
    semantic: Option<&dyn SemanticScorer>,
    req: &SearchRequest<'_>,
) -> Result<Vec<SearchResultItem>> {
    if req.query.trim().is_empty() || corpus.is_empty() {
        return Ok(Vec::new());
    }

    let semantic = match (req.mode.needs_embeddings(), semantic) {
        (true, None) => bail!("A semantic scorer is required for {} mode", req.mode),
        (_, s) => s,
    };

    let explain = |lexical_score: f64, semantic_similarity: f64, alpha: f64| {
        req.explain.then_some(ScoreExplanation {
            lexical_score,
            semantic_similarity,
            alpha,
        })
    };

    let results: Vec<SearchResultItem> = match (req.mode, semantic) {
        (SearchMode::Hybrid, Some(semantic)) => {
            let lex = lexical.lexical_scores(req.query, corpus)?;
            let dist = semantic.semantic_distances(req.query, corpus)?;
            fuse_scores(corpus, &lex, &dist, req.params)?
                .into_iter()
                .enumerate()
                .map(|(rank, hit)| SearchResultItem {
                    rank: rank + 1,
                    index: hit.index,
                    score: hit.score,
                    text: hit.item.text.clone(),
                    metadata: hit.item.metadata.clone(),
                    explain: explain(hit.lexical_score, hit.semantic_similarity, req.params.alpha),
                })
                .collect()
        }
        (SearchMode::Semantic, Some(semantic)) => {
            let dist = semantic.semantic_distances(req.query, corpus)?;
            check_dimensions(corpus.len(), corpus.len(), dist.len())?;
            let sims: Vec<f64> = dist.iter().map(|&d| semantic_similarity(d)).collect();
            single_signal(corpus, &sims, req.params.top_k, |i| {
                explain(0.0, sims[i], 1.0)
            })
        }
        _ => {
            let lex = lexical.lexical_scores(req.query, corpus)?;
            check_dimensions(corpus.len(), lex.len(), corpus.len())?;
            single_signal(corpus, &lex, req.params.top_k, |i| explain(lex[i], 0.0, 0.0))
        }
    };

    debug!(
        mode = %req.mode,
        corpus = corpus.len(),
        results = results.len(),
        "search complete"
    );
    Ok(results)
}

fn single_signal(
    corpus: &[CorpusItem],
    scores: &[f64],
    top_k: usize,
    explain: impl Fn(usize) -> Option<ScoreExplanation>,
) -> Vec<SearchResultItem> {
    rank_top_k(scores, top_k)
        .into_iter()
        .enumerate()
        .map(|(rank, i)| SearchResultItem {
            rank: rank + 1,
            index: i,
            score: scores[i],
            text: corpus[i].text.clone(),
            metadata: corpus[i].metadata.clone(),
            explain: explain(i),
        })
        .collect()
}
