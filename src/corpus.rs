//! JSON corpus loader.
//!
//! Reads a file containing a JSON array of records and turns each record
//! into a [`CorpusItem`]: the `content_key` field becomes the passage text
//! and every `metadata_keys` field is copied into the item's metadata
//! (missing fields become `null`).
//!
//! ```json
//! [
//!   { "id": 1, "title": "The lighthouse", "date": "2024-03-02", "text": "..." }
//! ]
//! ```

use anyhow::{bail, Context, Result};
use hybrid_harness_core::models::{is_scalar, CorpusItem};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::CorpusConfig;

/// Load and convert every record of the configured JSON file.
pub fn load_json_corpus(config: &CorpusConfig) -> Result<Vec<CorpusItem>> {
    let raw = std::fs::read_to_string(&config.path)
        .with_context(|| format!("Failed to read corpus file: {}", config.path.display()))?;
    parse_json_corpus(&raw, config)
        .with_context(|| format!("Invalid corpus file: {}", config.path.display()))
}

/// Convert JSON text to corpus items, in array order.
pub fn parse_json_corpus(raw: &str, config: &CorpusConfig) -> Result<Vec<CorpusItem>> {
    let value: Value = serde_json::from_str(raw)?;
    let records = match value {
        Value::Array(records) => records,
        _ => bail!("expected a JSON array of records"),
    };

    records
        .iter()
        .enumerate()
        .map(|(i, record)| record_to_item(i, record, config))
        .collect()
}

fn record_to_item(i: usize, record: &Value, config: &CorpusConfig) -> Result<CorpusItem> {
    let obj = match record {
        Value::Object(obj) => obj,
        _ => bail!("record {} is not a JSON object", i),
    };

    let text = match obj.get(&config.content_key) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => bail!("record {}: '{}' is not a string", i, config.content_key),
        None => bail!("record {}: missing '{}'", i, config.content_key),
    };

    let mut metadata = BTreeMap::new();
    for key in &config.metadata_keys {
        let value = obj.get(key).cloned().unwrap_or(Value::Null);
        if !is_scalar(&value) {
            bail!("record {}: metadata field '{}' is not a scalar", i, key);
        }
        metadata.insert(key.clone(), value);
    }

    Ok(CorpusItem { text, metadata })
}
