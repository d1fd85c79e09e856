//! The image currently loaded in the UI, persisted across restarts

use crate::error::SessionError;
use crate::key::ContentKey;
use crate::marker::MarkerStore;
use crate::record::{self, NAMESPACE};
use agrolens_store::SharedStorage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Decoded upload session
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub image: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub captured_at: DateTime<Utc>,
    pub key_hint: Option<ContentKey>,
}

impl UploadSession {
    /// Content key of the image; recomputed from the bytes, never trusted from the hint
    pub fn key(&self) -> ContentKey {
        ContentKey::derive(&self.image)
    }
}

/// Persisted form; bytes are base64 so the record stays a JSON string
#[derive(Debug, Serialize, Deserialize)]
struct StoredUpload {
    image_base64: String,
    file_name: String,
    mime_type: String,
    size_bytes: u64,
    captured_at: DateTime<Utc>,
    #[serde(default)]
    result_cache_key_hint: Option<ContentKey>,
}

impl StoredUpload {
    fn decode(self) -> Option<UploadSession> {
        let image = match STANDARD.decode(self.image_base64.as_bytes()) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "upload session image is not valid base64");
                return None;
            }
        };

        if image.len() as u64 != self.size_bytes {
            warn!(
                expected = self.size_bytes,
                actual = image.len(),
                "upload session size mismatch"
            );
            return None;
        }

        if let Some(hint) = &self.result_cache_key_hint {
            if *hint != ContentKey::derive(&image) {
                warn!(%hint, "upload session key hint does not match its bytes");
                return None;
            }
        }

        Some(UploadSession {
            image,
            file_name: self.file_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            captured_at: self.captured_at,
            key_hint: self.result_cache_key_hint,
        })
    }
}

/// Reads and writes the single upload session record
#[derive(Clone)]
pub struct UploadStore {
    storage: SharedStorage,
}

impl UploadStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    fn storage_key() -> String {
        format!("{NAMESPACE}:upload")
    }

    /// Replace the current session with `blob`. The record is written in one
    /// storage call so readers see either the old session or the new one.
    pub fn save(
        &self,
        blob: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<UploadSession, SessionError> {
        if blob.is_empty() {
            return Err(SessionError::Empty);
        }

        let key = ContentKey::derive(blob);
        let stored = StoredUpload {
            image_base64: STANDARD.encode(blob),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: blob.len() as u64,
            captured_at: Utc::now(),
            result_cache_key_hint: Some(key.clone()),
        };
        let json = serde_json::to_string(&stored)?;
        self.storage.set(&Self::storage_key(), &json)?;
        debug!(%key, file_name, size = blob.len(), "upload session saved");

        Ok(UploadSession {
            image: blob.to_vec(),
            file_name: stored.file_name,
            mime_type: stored.mime_type,
            size_bytes: stored.size_bytes,
            captured_at: stored.captured_at,
            key_hint: Some(key),
        })
    }

    /// Rehydrate the session; corrupted state reads as absent
    pub fn load(&self) -> Option<UploadSession> {
        record::read::<StoredUpload>(self.storage.as_ref(), &Self::storage_key())?.decode()
    }

    /// Abandon the current upload along with any in-flight marker.
    /// Cached results are kept.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove(&Self::storage_key())?;
        MarkerStore::new(self.storage.clone()).clear();
        debug!("upload session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalyzeParams;
    use agrolens_store::{MemoryStore, Storage};
    use std::sync::Arc;

    const JPEG: &[u8] = b"\xff\xd8\xff\xe0tomato-leaf";

    #[test]
    fn test_save_then_load() {
        let uploads = UploadStore::new(Arc::new(MemoryStore::new()));
        let saved = uploads.save(JPEG, "leaf.jpg", "image/jpeg").unwrap();

        let loaded = uploads.load().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.image, JPEG);
        assert_eq!(loaded.size_bytes, JPEG.len() as u64);
        assert_eq!(loaded.key_hint, Some(ContentKey::derive(JPEG)));
        assert_eq!(loaded.key(), ContentKey::derive(JPEG));
    }

    #[test]
    fn test_save_replaces_previous() {
        let uploads = UploadStore::new(Arc::new(MemoryStore::new()));
        uploads.save(JPEG, "first.jpg", "image/jpeg").unwrap();
        uploads.save(b"png-bytes", "second.png", "image/png").unwrap();

        let loaded = uploads.load().unwrap();
        assert_eq!(loaded.file_name, "second.png");
        assert_eq!(loaded.image, b"png-bytes");
    }

    #[test]
    fn test_save_rejects_empty() {
        let uploads = UploadStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            uploads.save(&[], "empty.jpg", "image/jpeg"),
            Err(SessionError::Empty)
        ));
        assert!(uploads.load().is_none());
    }

    #[test]
    fn test_save_surfaces_quota_error() {
        let uploads = UploadStore::new(Arc::new(MemoryStore::with_quota(16)));
        let err = uploads.save(JPEG, "leaf.jpg", "image/jpeg").unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
    }

    #[test]
    fn test_clear_removes_session_and_marker() {
        let store = Arc::new(MemoryStore::new());
        let uploads = UploadStore::new(store.clone());
        let markers = MarkerStore::new(store.clone());

        let session = uploads.save(JPEG, "leaf.jpg", "image/jpeg").unwrap();
        markers.begin(
            &session.key(),
            &AnalyzeParams {
                model: "default".to_string(),
                save_for_training: false,
                debug: false,
            },
        );

        uploads.clear().unwrap();
        assert!(uploads.load().is_none());
        assert!(markers.current().is_none());
    }

    #[test]
    fn test_load_garbage_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let uploads = UploadStore::new(store.clone());
        store.set("agrolens:upload", "\u{0}\u{1}garbage").unwrap();
        assert!(uploads.load().is_none());
    }

    #[test]
    fn test_load_bad_base64_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let uploads = UploadStore::new(store.clone());
        uploads.save(JPEG, "leaf.jpg", "image/jpeg").unwrap();

        let raw = store.get("agrolens:upload").unwrap().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        value["image_base64"] = serde_json::json!("!!not base64!!");
        store.set("agrolens:upload", &value.to_string()).unwrap();

        assert!(uploads.load().is_none());
    }

    #[test]
    fn test_load_size_or_hint_mismatch_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let uploads = UploadStore::new(store.clone());
        uploads.save(JPEG, "leaf.jpg", "image/jpeg").unwrap();
        let raw = store.get("agrolens:upload").unwrap().unwrap();

        let mut truncated: serde_json::Value = serde_json::from_str(&raw).unwrap();
        truncated["size_bytes"] = serde_json::json!(3);
        store.set("agrolens:upload", &truncated.to_string()).unwrap();
        assert!(uploads.load().is_none());

        let mut wrong_hint: serde_json::Value = serde_json::from_str(&raw).unwrap();
        wrong_hint["result_cache_key_hint"] = serde_json::json!("ffffffffffffffff");
        store.set("agrolens:upload", &wrong_hint.to_string()).unwrap();
        assert!(uploads.load().is_none());
    }
}
