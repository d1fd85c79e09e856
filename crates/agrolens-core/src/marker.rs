//! Durable in-flight marker: the cross-reload single-flight mutex

use crate::key::ContentKey;
use crate::record::{self, NAMESPACE};
use crate::types::AnalyzeParams;
use agrolens_store::SharedStorage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the pending request was sent with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerParams {
    pub key: ContentKey,
    #[serde(flatten)]
    pub params: AnalyzeParams,
}

/// Written right before the network call, removed when it settles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InFlightMarker {
    pub in_progress: bool,
    pub started_at: DateTime<Utc>,
    pub request_params: MarkerParams,
}

impl InFlightMarker {
    pub fn key(&self) -> &ContentKey {
        &self.request_params.key
    }

    /// Whether the marker was written less than `ttl` ago
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.started_at);
        match age.to_std() {
            Ok(age) => age < ttl,
            // started_at in the future (clock skew): treat as live
            Err(_) => true,
        }
    }
}

/// Access to the single marker record
#[derive(Clone)]
pub struct MarkerStore {
    storage: SharedStorage,
}

impl MarkerStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    fn storage_key() -> String {
        format!("{NAMESPACE}:inflight")
    }

    /// Record that a request for `key` is about to be issued
    pub fn begin(&self, key: &ContentKey, params: &AnalyzeParams) -> InFlightMarker {
        let marker = InFlightMarker {
            in_progress: true,
            started_at: Utc::now(),
            request_params: MarkerParams {
                key: key.clone(),
                params: params.clone(),
            },
        };
        record::write_lossy(self.storage.as_ref(), &Self::storage_key(), &marker);
        marker
    }

    /// The live marker, if any
    pub fn current(&self) -> Option<InFlightMarker> {
        record::read::<InFlightMarker>(self.storage.as_ref(), &Self::storage_key())
            .filter(|m| m.in_progress)
    }

    /// Clear the marker only if it still belongs to `key`
    pub fn settle(&self, key: &ContentKey) {
        if self.current().is_some_and(|m| m.key() != key) {
            return;
        }
        self.clear();
    }

    pub fn clear(&self) {
        record::remove_lossy(self.storage.as_ref(), &Self::storage_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrolens_store::{MemoryStore, Storage};
    use std::sync::Arc;

    fn params() -> AnalyzeParams {
        AnalyzeParams {
            model: "plant-v2".to_string(),
            save_for_training: false,
            debug: true,
        }
    }

    #[test]
    fn test_begin_and_current() {
        let markers = MarkerStore::new(Arc::new(MemoryStore::new()));
        assert!(markers.current().is_none());

        let key = ContentKey::derive(b"leaf");
        markers.begin(&key, &params());

        let marker = markers.current().unwrap();
        assert_eq!(marker.key(), &key);
        assert_eq!(marker.request_params.params.model, "plant-v2");
        assert!(marker.request_params.params.debug);
    }

    #[test]
    fn test_settle_ignores_foreign_marker() {
        let markers = MarkerStore::new(Arc::new(MemoryStore::new()));
        let a = ContentKey::derive(b"a");
        let b = ContentKey::derive(b"b");

        markers.begin(&b, &params());
        markers.settle(&a);
        assert_eq!(markers.current().unwrap().key(), &b);

        markers.settle(&b);
        assert!(markers.current().is_none());
    }

    #[test]
    fn test_freshness() {
        let markers = MarkerStore::new(Arc::new(MemoryStore::new()));
        let mut marker = markers.begin(&ContentKey::derive(b"a"), &params());
        assert!(marker.is_fresh(Duration::from_secs(30)));

        marker.started_at = Utc::now() - chrono::Duration::seconds(120);
        assert!(!marker.is_fresh(Duration::from_secs(30)));
    }

    #[test]
    fn test_wire_shape() {
        let store = Arc::new(MemoryStore::new());
        let markers = MarkerStore::new(store.clone());
        markers.begin(&ContentKey::derive(b"abc"), &params());

        let raw = store.get("agrolens:inflight").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["in_progress"], true);
        assert_eq!(value["request_params"]["key"], "ba7816bf8f01cfea");
        assert_eq!(value["request_params"]["model"], "plant-v2");
    }

    #[test]
    fn test_inactive_marker_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let markers = MarkerStore::new(store.clone());
        let mut marker = markers.begin(&ContentKey::derive(b"a"), &params());
        marker.in_progress = false;
        store
            .set("agrolens:inflight", &serde_json::to_string(&marker).unwrap())
            .unwrap();

        assert!(markers.current().is_none());
    }
}
