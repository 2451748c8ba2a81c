//! # Local Drafts
//!
//! Unsaved work is kept in a string key-value store (browser local storage
//! in the web shell) as `{ content, metrics, savedAt }`. The content is the
//! same structured form that gets persisted, so restoring a draft is an
//! ordinary decode.

use chrono::{DateTime, Utc};
use scribe_codec::{Metrics, StructuredForm};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

const DRAFT_KEY_PREFIX: &str = "article_draft_";

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Draft serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Draft store error: {0}")]
    Store(String),
}

/// Storage key for an article's draft; unsaved articles share one key
pub fn draft_key(article_id: Option<i64>) -> String {
    match article_id {
        Some(id) => format!("{}{}", DRAFT_KEY_PREFIX, id),
        None => format!("{}new", DRAFT_KEY_PREFIX),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub content: StructuredForm,
    pub metrics: Metrics,
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn to_json(&self) -> Result<String, DraftError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DraftError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// String key-value store holding serialized drafts
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError>;

    fn set(&self, key: &str, value: String) -> Result<(), DraftError>;

    fn remove(&self, key: &str) -> Result<(), DraftError>;
}

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DraftError> {
        self.entries
            .lock()
            .map_err(|_| DraftError::Store("draft store lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DraftError> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_draft_keys() {
        assert_eq!(draft_key(Some(42)), "article_draft_42");
        assert_eq!(draft_key(None), "article_draft_new");
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = DraftSnapshot {
            content: StructuredForm::default(),
            metrics: Metrics {
                word_count: 0,
                reading_time: 1,
                excerpt: String::new(),
            },
            saved_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "content": { "blocks": [] },
                "metrics": { "wordCount": 0, "readingTime": 1, "excerpt": "" },
                "savedAt": "2024-05-01T12:00:00Z"
            })
        );
        assert_eq!(DraftSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap(), snapshot);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryDraftStore::new();
        assert!(store.is_empty());

        store.set("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
