//! Content-addressed cache of diagnosis results

use crate::key::ContentKey;
use crate::record::{self, NAMESPACE};
use crate::types::{CacheEntry, Detection, DiagnosisResult};
use agrolens_store::SharedStorage;
use chrono::Utc;

/// Durable map from [`ContentKey`] to the last successful analysis.
///
/// A pure optimization layer: every storage failure degrades to a miss or a
/// no-op. Entries never expire.
#[derive(Clone)]
pub struct ResultCache {
    storage: SharedStorage,
}

impl ResultCache {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    fn storage_key(key: &ContentKey) -> String {
        format!("{NAMESPACE}:cache:{key}")
    }

    /// Local lookup, never touches the network or mutates state
    pub fn get(&self, key: &ContentKey) -> Option<CacheEntry> {
        let entry: CacheEntry = record::read(self.storage.as_ref(), &Self::storage_key(key))?;
        // An entry filed under the wrong key is treated as corruption
        (entry.key == *key).then_some(entry)
    }

    /// Store a result, replacing any previous entry for `key` wholesale.
    ///
    /// Returns the entry that was written (or would have been, if storage
    /// refused it).
    pub fn put(
        &self,
        key: &ContentKey,
        result: DiagnosisResult,
        detections: Vec<Detection>,
    ) -> CacheEntry {
        let entry = CacheEntry {
            key: key.clone(),
            result,
            detections,
            stored_at: Utc::now(),
        };
        record::write_lossy(self.storage.as_ref(), &Self::storage_key(key), &entry);
        entry
    }

    /// Whether a readable entry exists for `key`
    pub fn contains(&self, key: &ContentKey) -> bool {
        self.get(key).is_some()
    }
}
