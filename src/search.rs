//! Search entry point wiring config, index, and scorers together.
//!
//! This is a thin adapter over [`hybrid_harness_core::search::search`]:
//! it resolves the mode and tuning from [`SearchOptions`] and [`Config`],
//! ensures the index exists, and builds the scorers from the loaded
//! [`IndexHandle`](crate::index::IndexHandle).

use anyhow::{bail, Result};
use hybrid_harness_core::embedding::{EmbeddingProvider, EmbeddingScorer};
use hybrid_harness_core::fusion::FusionParams;
use hybrid_harness_core::scorer::SemanticScorer;
use hybrid_harness_core::search::{search, SearchMode, SearchRequest, SearchResultItem};
use tracing::info;

use crate::config::Config;
use crate::embedding::create_provider;
use crate::index::ensure_index;

/// Per-query overrides. `None` falls back to the `[retrieval]` config.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub query: String,
    pub mode: Option<String>,
    pub alpha: Option<f64>,
    pub top_k: Option<usize>,
    pub explain: bool,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Search with the provider named in `[embedding]`.
pub fn run_search(config: &Config, opts: &SearchOptions) -> Result<Vec<SearchResultItem>> {
    let provider = create_provider(&config.embedding)?;
    run_search_with_provider(config, opts, provider.as_ref())
}

/// Search with an explicit embedding provider.
pub fn run_search_with_provider(
    config: &Config,
    opts: &SearchOptions,
    provider: &dyn EmbeddingProvider,
) -> Result<Vec<SearchResultItem>> {
    if opts.query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mode: SearchMode = opts
        .mode
        .as_deref()
        .unwrap_or(&config.retrieval.mode)
        .parse()?;

    if mode.needs_embeddings() && !config.embedding.is_enabled() {
        bail!(
            "Mode '{}' requires embeddings. Set [embedding] provider in config.",
            mode
        );
    }

    let alpha = opts.alpha.unwrap_or(config.retrieval.hybrid_alpha);
    if !(0.0..=1.0).contains(&alpha) {
        bail!("alpha must be in [0.0, 1.0], got {}", alpha);
    }
    let top_k = opts.top_k.unwrap_or(config.retrieval.top_k);

    let handle = ensure_index(config, provider)?;

    let embedding_scorer = handle
        .vectors
        .as_ref()
        .map(|index| EmbeddingScorer { provider, index });
    let semantic = embedding_scorer
        .as_ref()
        .map(|s| s as &dyn SemanticScorer);

    let request = SearchRequest {
        query: &opts.query,
        mode,
        params: FusionParams { alpha, top_k },
        explain: opts.explain,
    };

    let results = search(&handle.corpus, &handle.tfidf, semantic, &request)?;
    info!(
        %mode,
        alpha,
        top_k,
        results = results.len(),
        "search finished"
    );
    Ok(results)
}
