//! Persistent index build with a once-only contract.
//!
//! [`ensure_index`] returns an [`IndexHandle`] holding the corpus, the
//! TF-IDF index, and (when embeddings are enabled) the vector index. The
//! first call builds and persists them under `index.dir`; later calls load
//! the persisted files as long as the corpus file and its `[corpus]` keys
//! are unchanged.
//!
//! # Layout
//!
//! | File | Content |
//! |------|---------|
//! | `manifest.json` | corpus fingerprint, corpus keys, item count, build time, vector model |
//! | `documents.json` | the corpus items, in index order |
//! | `tfidf.json` | the fitted [`TfIdfIndex`] |
//! | `vectors.json` | the [`VectorIndex`], one vector per item |
//!
//! The manifest is written last, so an interrupted build is redone on the
//! next call.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hybrid_harness_core::embedding::{EmbeddingProvider, VectorIndex};
use hybrid_harness_core::models::CorpusItem;
use hybrid_harness_core::tfidf::TfIdfIndex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::corpus::parse_json_corpus;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DOCUMENTS_FILE: &str = "documents.json";
pub const TFIDF_FILE: &str = "tfidf.json";
pub const VECTORS_FILE: &str = "vectors.json";

/// Build record for the persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// SHA-256 of the corpus file bytes.
    pub corpus_sha256: String,
    /// `[corpus]` keys the documents were extracted with.
    #[serde(default)]
    pub content_key: String,
    #[serde(default)]
    pub metadata_keys: Vec<String>,
    pub items: usize,
    pub built_at: DateTime<Utc>,
    /// Model of `vectors.json`, if vectors were built.
    pub vector_model: Option<String>,
}

/// Everything a search needs, loaded into memory.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    pub dir: PathBuf,
    pub manifest: IndexManifest,
    pub corpus: Vec<CorpusItem>,
    pub tfidf: TfIdfIndex,
    pub vectors: Option<VectorIndex>,
}

/// Load the persisted index, building whatever is missing or stale.
///
/// - Missing manifest, changed corpus file, or changed `content_key` /
///   `metadata_keys`: parse the corpus, refit
///   TF-IDF, persist, and drop any vectors built for the old corpus.
/// - Embeddings enabled and no vectors for the provider's model: embed the
///   corpus and persist the vectors.
/// - Otherwise: load from disk without touching the corpus source.
pub fn ensure_index(config: &Config, provider: &dyn EmbeddingProvider) -> Result<IndexHandle> {
    let dir = config.index.dir.clone();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

    let raw = std::fs::read_to_string(&config.corpus.path).with_context(|| {
        format!(
            "Failed to read corpus file: {}",
            config.corpus.path.display()
        )
    })?;
    let fingerprint = sha256_hex(raw.as_bytes());

    let existing: Option<IndexManifest> = read_optional(&dir.join(MANIFEST_FILE))?;

    let (mut manifest, corpus, tfidf) = match existing.clone() {
        Some(manifest) if is_current(&manifest, config, &fingerprint) => {
            info!(dir = %dir.display(), items = manifest.items, "index already exists, skipping build");
            let corpus: Vec<CorpusItem> = read_json(&dir.join(DOCUMENTS_FILE))?;
            let tfidf: TfIdfIndex = read_json(&dir.join(TFIDF_FILE))?;
            (manifest, corpus, tfidf)
        }
        previous => {
            if previous.is_some() {
                info!(dir = %dir.display(), "corpus or corpus keys changed, rebuilding index");
            }
            build_lexical(config, &dir, &raw, fingerprint)?
        }
    };

    let vectors = if config.embedding.is_enabled() {
        Some(ensure_vectors(config, &dir, provider, &corpus, &mut manifest)?)
    } else {
        None
    };

    if existing.as_ref() != Some(&manifest) {
        write_json(&dir.join(MANIFEST_FILE), &manifest)?;
    }

    Ok(IndexHandle {
        dir,
        manifest,
        corpus,
        tfidf,
        vectors,
    })
}

fn is_current(manifest: &IndexManifest, config: &Config, fingerprint: &str) -> bool {
    manifest.corpus_sha256 == fingerprint
        && manifest.content_key == config.corpus.content_key
        && manifest.metadata_keys == config.corpus.metadata_keys
}

/// Parse `raw` (the bytes that were fingerprinted) and fit TF-IDF on it.
fn build_lexical(
    config: &Config,
    dir: &Path,
    raw: &str,
    fingerprint: String,
) -> Result<(IndexManifest, Vec<CorpusItem>, TfIdfIndex)> {
    let corpus = parse_json_corpus(raw, &config.corpus).with_context(|| {
        format!("Invalid corpus file: {}", config.corpus.path.display())
    })?;
    let texts: Vec<&str> = corpus.iter().map(|item| item.text.as_str()).collect();
    let tfidf = TfIdfIndex::fit(&texts);

    write_json(&dir.join(DOCUMENTS_FILE), &corpus)?;
    write_json(&dir.join(TFIDF_FILE), &tfidf)?;

    info!(
        items = corpus.len(),
        vocabulary = tfidf.vocabulary_size(),
        "built TF-IDF index"
    );

    let manifest = IndexManifest {
        corpus_sha256: fingerprint,
        content_key: config.corpus.content_key.clone(),
        metadata_keys: config.corpus.metadata_keys.clone(),
        items: corpus.len(),
        built_at: Utc::now(),
        vector_model: None,
    };
    Ok((manifest, corpus, tfidf))
}

fn ensure_vectors(
    config: &Config,
    dir: &Path,
    provider: &dyn EmbeddingProvider,
    corpus: &[CorpusItem],
    manifest: &mut IndexManifest,
) -> Result<VectorIndex> {
    let path = dir.join(VECTORS_FILE);

    if manifest.vector_model.as_deref() == Some(provider.model_name()) {
        if let Some(vectors) = read_optional::<VectorIndex>(&path)? {
            if vectors.len() == corpus.len() && vectors.dims == provider.dims() {
                info!(model = %vectors.model, "vector index already exists, skipping build");
                return Ok(vectors);
            }
        }
    }

    let vectors = VectorIndex::build(provider, corpus, config.embedding.batch_size)?;
    write_json(&path, &vectors)?;
    info!(
        model = %vectors.model,
        dims = vectors.dims,
        items = vectors.len(),
        "built vector index"
    );
    manifest.vector_model = Some(vectors.model.clone());
    Ok(vectors)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Malformed index file: {}", path.display()))
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write index file: {}", path.display()))
}
