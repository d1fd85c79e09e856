#![allow(dead_code)]

use agrolens_core::{
    AnalyzeParams, Category, Config, ContentKey, Detection, DiagnosisResult, EndpointError,
    InFlightMarker, InferenceEndpoint, InferenceRequest, InferenceResponse, MarkerParams,
    Prediction, Provider, RequestCoordinator, Severity,
};
use agrolens_store::{MemoryStore, SharedStorage, Storage, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const LEAF: &[u8] = b"\xff\xd8\xff\xe0leaf-with-brown-lesions";
pub const OTHER_LEAF: &[u8] = b"\xff\xd8\xff\xe0healthy-maize-leaf";

/// Endpoint double that counts calls and always answers with one diagnosis
#[derive(Clone)]
pub struct MockEndpoint {
    calls: Arc<AtomicUsize>,
    label: &'static str,
    confidence: f64,
    delay: Duration,
}

impl MockEndpoint {
    pub fn new(label: &'static str, confidence: f64) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            label,
            confidence,
            delay: Duration::from_millis(10),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceEndpoint for MockEndpoint {
    async fn analyze(&self, request: InferenceRequest) -> Result<InferenceResponse, EndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if request.image.is_empty() {
            return Err(EndpointError::Malformed("empty image".to_string()));
        }

        Ok(InferenceResponse {
            result: DiagnosisResult {
                label: self.label.to_string(),
                confidence: self.confidence,
                category: Some(Category::Disease),
                severity: Some(Severity::Moderate),
                alternatives: vec![Prediction {
                    label: "rust".to_string(),
                    confidence: 0.05,
                }],
                guidance: "Remove infected leaves.".to_string(),
                provider: Some(Provider {
                    name: request.params.model.clone(),
                    confidence: 0.99,
                }),
            },
            detections: vec![Detection {
                label: self.label.to_string(),
                confidence: self.confidence,
                bbox: Some([10.0, 20.0, 64.0, 48.0]),
            }],
        })
    }
}

pub fn coordinator(
    storage: SharedStorage,
    endpoint: &MockEndpoint,
) -> RequestCoordinator<MockEndpoint> {
    RequestCoordinator::new(storage, endpoint.clone(), Config::new())
}

pub fn memory_storage() -> SharedStorage {
    Arc::new(MemoryStore::new())
}

/// Marker JSON as a previous process would have left it
pub fn marker_for(bytes: &[u8], age: Duration) -> String {
    let started_at = chrono::Utc::now()
        - chrono::Duration::from_std(age).unwrap_or_else(|_| chrono::Duration::zero());
    let marker = InFlightMarker {
        in_progress: true,
        started_at,
        request_params: MarkerParams {
            key: ContentKey::derive(bytes),
            params: AnalyzeParams {
                model: "default".to_string(),
                save_for_training: false,
                debug: false,
            },
        },
    };
    serde_json::to_string(&marker).unwrap()
}

/// Storage whose cache writes always hit the quota
pub struct FullCacheStore {
    inner: MemoryStore,
}

impl FullCacheStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
        }
    }
}

impl Storage for FullCacheStore {
    fn get(&self, key: &str) -> agrolens_store::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> agrolens_store::Result<()> {
        if key.starts_with("agrolens:cache:") {
            return Err(StorageError::QuotaExceeded {
                needed: key.len() + value.len(),
                quota: 0,
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> agrolens_store::Result<()> {
        self.inner.remove(key)
    }
}
