//! Core data models shared by the scorers and the fusion step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single searchable passage plus its provenance metadata.
///
/// Items are identified by their position in the corpus slice for the
/// duration of one search call. Metadata values are scalars (string,
/// number, bool, or null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusItem {
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl CorpusItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Metadata value as a string slice, if present and a string.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Returns true if `value` is allowed as corpus metadata.
pub fn is_scalar(value: &serde_json::Value) -> bool {
    !matches!(
        value,
        serde_json::Value::Array(_) | serde_json::Value::Object(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_metadata() {
        let item = CorpusItem::new("flying over the sea")
            .with_metadata("title", json!("Sea"))
            .with_metadata("id", json!(3));
        assert_eq!(item.meta_str("title"), Some("Sea"));
        assert_eq!(item.meta_str("id"), None);
        assert_eq!(item.metadata.len(), 2);
    }

    #[test]
    fn test_is_scalar() {
        assert!(is_scalar(&json!("a")));
        assert!(is_scalar(&json!(1.5)));
        assert!(is_scalar(&json!(null)));
        assert!(!is_scalar(&json!([1])));
        assert!(!is_scalar(&json!({"a": 1})));
    }
}
