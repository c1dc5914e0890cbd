//! TF-IDF lexical index.
//!
//! Fits a vocabulary and inverse document frequencies over a fixed list of
//! passages and scores queries by cosine similarity in TF-IDF space.
//!
//! # Weighting
//!
//! - Tokens: lowercase text, matches of `(?u)\b\w\w+\b` (words of two or
//!   more word characters).
//! - Smoothed IDF: `idf(t) = ln((1 + n) / (1 + df(t))) + 1`.
//! - Row weight: raw term count × idf, then L2-normalized.
//!
//! Because every row and the query vector are unit length, the cosine
//! similarity is a plain dot product and lies in `[0, 1]`.
//!
//! # Example
//!
//! ```rust
//! use hybrid_harness_core::tfidf::TfIdfIndex;
//!
//! let index = TfIdfIndex::fit(&["the red house", "a blue boat"]);
//! let scores = index.scores("red house");
//! assert!(scores[0] > scores[1]);
//! assert_eq!(scores[1], 0.0);
//! ```

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::models::CorpusItem;
use crate::scorer::LexicalScorer;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern compiles"));

/// Split text into lowercase index terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A fitted TF-IDF model plus the weighted rows of the corpus it was fit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfIndex {
    /// Term → column, columns assigned in alphabetical order.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// One L2-normalized sparse row per document, `(column, weight)` sorted by column.
    rows: Vec<Vec<(usize, f64)>>,
}

impl TfIdfIndex {
    /// Fit the vocabulary and IDF on `texts` and weight every row.
    pub fn fit<S: AsRef<str>>(texts: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n = texts.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(df.len());
        for (col, (term, count)) in df.iter().enumerate() {
            vocabulary.insert((*term).to_string(), col);
            idf.push(((1.0 + n) / (1.0 + *count as f64)).ln() + 1.0);
        }

        let mut index = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(tokenized.len()),
        };
        let rows: Vec<Vec<(usize, f64)>> = tokenized.iter().map(|t| index.weigh(t)).collect();
        index.rows = rows;
        index
    }

    /// Number of documents the index was fit on.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of `term`, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }

    /// Weight `text` against the fitted vocabulary. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        self.weigh(&tokenize(text))
    }

    /// Cosine similarity of `query` against every fitted row, in fit order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let q = self.transform(query);
        if q.is_empty() {
            return vec![0.0; self.rows.len()];
        }
        let mut dense = vec![0.0; self.vocabulary.len()];
        for &(col, w) in &q {
            dense[col] = w;
        }
        self.rows
            .iter()
            .map(|row| row.iter().map(|&(col, w)| w * dense[col]).sum())
            .collect()
    }

    fn weigh(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&col) = self.vocabulary.get(token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }
}

impl LexicalScorer for TfIdfIndex {
    fn lexical_scores(&self, query: &str, corpus: &[CorpusItem]) -> Result<Vec<f64>> {
        if corpus.len() != self.rows.len() {
            bail!(
                "TF-IDF index was fit on {} documents but the corpus has {}",
                self.rows.len(),
                corpus.len()
            );
        }
        Ok(self.scores(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Eu voei sobre o MAR, e vi 3 baleias!"),
            vec!["eu", "voei", "sobre", "mar", "vi", "baleias"]
        );
    }

    #[test]
    fn test_tokenize_unicode() {
        assert_eq!(tokenize("Ação às cegas"), vec!["ação", "às", "cegas"]);
    }

    #[test]
    fn test_idf_smoothing() {
        let index = TfIdfIndex::fit(&["cat dog", "cat bird"]);
        // df(cat) = 2 → ln(3/3) + 1
        assert!((index.idf("cat").unwrap() - 1.0).abs() < 1e-12);
        // df(dog) = 1 → ln(3/2) + 1
        assert!((index.idf("dog").unwrap() - ((1.5f64).ln() + 1.0)).abs() < 1e-12);
        assert_eq!(index.idf("fish"), None);
        assert_eq!(index.vocabulary_size(), 3);
    }

    #[test]
    fn test_rows_unit_length() {
        let index = TfIdfIndex::fit(&["one two two three", "three four"]);
        for row in &index.rows {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_self_query_scores_one() {
        let docs = [
            "I was flying over a city at night",
            "A dog followed me through the forest",
            "The ocean was made of glass",
        ];
        let index = TfIdfIndex::fit(&docs);
        let scores = index.scores(docs[1]);
        assert!((scores[1] - 1.0).abs() < 1e-9);
        assert!(scores[0] < scores[1]);
        assert!(scores[2] < scores[1]);
    }

    #[test]
    fn test_unknown_query_all_zero() {
        let index = TfIdfIndex::fit(&["alpha beta", "gamma delta"]);
        assert_eq!(index.scores("zeta"), vec![0.0, 0.0]);
        assert_eq!(index.scores(""), vec![0.0, 0.0]);
    }

    #[test]
    fn test_rare_term_outweighs_common() {
        let index = TfIdfIndex::fit(&["sea sky", "sea sun", "sea moon"]);
        let scores = index.scores("sea moon");
        assert!(scores[2] > scores[0]);
        assert!((scores[0] - scores[1]).abs() < 1e-12);
    }

    #[test]
    fn test_empty_fit() {
        let index = TfIdfIndex::fit::<&str>(&[]);
        assert!(index.is_empty());
        assert!(index.scores("anything").is_empty());
    }

    #[test]
    fn test_lexical_scorer_length_check() {
        let index = TfIdfIndex::fit(&["a house", "a boat"]);
        let corpus = vec![CorpusItem::new("a house")];
        assert!(index.lexical_scores("house", &corpus).is_err());

        let corpus = vec![CorpusItem::new("a house"), CorpusItem::new("a boat")];
        let scores = index.lexical_scores("house", &corpus).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > 0.0);
    }

    #[test]
    fn test_serde_preserves_scores() {
        let index = TfIdfIndex::fit(&["red house", "blue house"]);
        let json = serde_json::to_string(&index).unwrap();
        let restored: TfIdfIndex = serde_json::from_str(&json).unwrap();
        for (a, b) in restored.scores("red").iter().zip(index.scores("red")) {
            assert!((a - b).abs() < 1e-12);
        }
        assert_eq!(restored.len(), 2);
    }
}
