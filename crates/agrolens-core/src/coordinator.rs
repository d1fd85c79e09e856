//! Analyze-image state machine.
//!
//! ```text
//! Idle -> KeyComputed -> CacheHit
//!                     -> CacheMiss -> InFlight -> Succeeded | Failed
//! ```
//!
//! The coordinator is the only writer of the four durable records (result
//! cache, upload session, in-flight marker, last diagnosis). Two guards keep
//! at most one request per content key outstanding: an in-process claim set
//! for concurrent futures and the durable marker for other processes and
//! restarts.

use crate::cache::ResultCache;
use crate::config::Config;
use crate::endpoint::{InferenceEndpoint, InferenceRequest};
use crate::error::{CoordinatorError, SessionError};
use crate::key::ContentKey;
use crate::marker::{InFlightMarker, MarkerStore};
use crate::publisher::LastDiagnosisPublisher;
use crate::session::{UploadSession, UploadStore};
use crate::types::{AnalyzeParams, CacheEntry, LastDiagnosis};
use agrolens_store::SharedStorage;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Coordinator phase, as shown to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    KeyComputed,
    CacheHit,
    CacheMiss,
    InFlight,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::CacheHit | Phase::Succeeded | Phase::Failed)
    }
}

/// Snapshot of the coordinator for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorState {
    pub phase: Phase,
    pub key: Option<ContentKey>,
    pub entry: Option<CacheEntry>,
    pub error: Option<String>,
}

impl CoordinatorState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            key: None,
            entry: None,
            error: None,
        }
    }
}

/// How an analyze or resume call settled without error
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Served from the result cache, no network call
    CacheHit(CacheEntry),
    /// Fresh result from the endpoint, now cached
    Fresh(CacheEntry),
    /// A request for this key is already outstanding; nothing was done
    AlreadyInFlight(ContentKey),
}

impl Outcome {
    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Outcome::CacheHit(entry) | Outcome::Fresh(entry) => Some(entry),
            Outcome::AlreadyInFlight(_) => None,
        }
    }
}

/// Removes its key from the claim set when dropped
struct FlightClaim<'a> {
    claims: &'a Mutex<HashSet<ContentKey>>,
    key: ContentKey,
}

impl Drop for FlightClaim<'_> {
    fn drop(&mut self) {
        lock(self.claims).remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct RequestCoordinator<E> {
    endpoint: E,
    config: Config,
    cache: ResultCache,
    uploads: UploadStore,
    markers: MarkerStore,
    publisher: LastDiagnosisPublisher,
    claims: Mutex<HashSet<ContentKey>>,
    state: Mutex<CoordinatorState>,
    resume_checked: AtomicBool,
}

impl<E: InferenceEndpoint> RequestCoordinator<E> {
    pub fn new(storage: SharedStorage, endpoint: E, config: Config) -> Self {
        Self {
            endpoint,
            config,
            cache: ResultCache::new(storage.clone()),
            uploads: UploadStore::new(storage.clone()),
            markers: MarkerStore::new(storage.clone()),
            publisher: LastDiagnosisPublisher::new(storage),
            claims: Mutex::new(HashSet::new()),
            state: Mutex::new(CoordinatorState::idle()),
            resume_checked: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        lock(&self.state).clone()
    }

    /// Make `blob` the current image. Analysis is a separate, explicit step.
    pub fn upload(
        &self,
        blob: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<UploadSession, SessionError> {
        let session = self.uploads.save(blob, file_name, mime_type)?;
        *lock(&self.state) = CoordinatorState::idle();
        Ok(session)
    }

    /// Drop the current image and any in-flight marker; cached results stay
    pub fn clear_upload(&self) -> Result<(), SessionError> {
        self.uploads.clear()?;
        *lock(&self.state) = CoordinatorState::idle();
        Ok(())
    }

    pub fn current_upload(&self) -> Option<UploadSession> {
        self.uploads.load()
    }

    /// Cached result for `key`, if any
    pub fn lookup(&self, key: &ContentKey) -> Option<CacheEntry> {
        self.cache.get(key)
    }

    pub fn is_cached(&self, key: &ContentKey) -> bool {
        self.cache.contains(key)
    }

    pub fn in_flight_marker(&self) -> Option<InFlightMarker> {
        self.markers.current()
    }

    /// Analyze the current upload with the configured parameters
    pub async fn analyze(&self) -> Result<Outcome, CoordinatorError> {
        self.analyze_with(self.config.analyze_params()).await
    }

    /// Analyze the current upload with explicit parameters
    pub async fn analyze_with(&self, params: AnalyzeParams) -> Result<Outcome, CoordinatorError> {
        let session = self.uploads.load().ok_or(CoordinatorError::NoUpload)?;
        let key = session.key();
        if !key.is_analyzable() {
            return Err(CoordinatorError::NotAnalyzable);
        }

        let Some(claim) = self.claim(&key) else {
            debug!(%key, "analysis already running in this process");
            return Ok(Outcome::AlreadyInFlight(key));
        };

        self.transition(Phase::KeyComputed, &key);
        if let Some(entry) = self.cache.get(&key) {
            return Ok(self.serve_hit(entry));
        }

        if let Some(marker) = self.markers.current() {
            if marker.key() == &key && marker.is_fresh(self.config.timeout) {
                debug!(%key, started_at = %marker.started_at, "analysis already running elsewhere");
                self.transition(Phase::InFlight, &key);
                return Ok(Outcome::AlreadyInFlight(key));
            }
        }

        self.transition(Phase::CacheMiss, &key);
        self.issue(session, key, params, false, claim).await
    }

    /// Startup reconciliation. Only the first call per coordinator does anything.
    ///
    /// With an upload, a marker for that upload and no cached result, the
    /// marker's request is re-issued once. With a cached result the marker is
    /// discarded and the hit is reported. A marker for some other image, or
    /// with no upload at all, is discarded.
    pub async fn resume(&self) -> Result<Option<Outcome>, CoordinatorError> {
        self.reconcile(false).await
    }

    /// Startup reconciliation for a process that is about to analyze.
    ///
    /// Same as [`resume`](Self::resume), except that a marker for the current
    /// upload still younger than the request timeout is left alone and
    /// reported as `AlreadyInFlight`: another process may still be waiting
    /// on that request.
    pub async fn resume_abandoned(&self) -> Result<Option<Outcome>, CoordinatorError> {
        self.reconcile(true).await
    }

    async fn reconcile(&self, respect_lease: bool) -> Result<Option<Outcome>, CoordinatorError> {
        if self.resume_checked.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        let Some(marker) = self.markers.current() else {
            return Ok(None);
        };

        let Some(session) = self.uploads.load() else {
            info!(key = %marker.key(), "discarding in-flight marker with no upload");
            self.markers.clear();
            return Ok(None);
        };

        let key = session.key();
        if marker.key() != &key {
            info!(marker = %marker.key(), upload = %key, "discarding in-flight marker for another image");
            self.markers.clear();
            return Ok(None);
        }

        let Some(claim) = self.claim(&key) else {
            return Ok(Some(Outcome::AlreadyInFlight(key)));
        };

        self.transition(Phase::KeyComputed, &key);
        if let Some(entry) = self.cache.get(&key) {
            info!(%key, "request finished before restart; discarding stale marker");
            self.markers.clear();
            return Ok(Some(self.serve_hit(entry)));
        }

        if respect_lease && marker.is_fresh(self.config.timeout) {
            debug!(%key, started_at = %marker.started_at, "marker is still leased; not resuming");
            self.transition(Phase::InFlight, &key);
            return Ok(Some(Outcome::AlreadyInFlight(key)));
        }

        info!(%key, started_at = %marker.started_at, "resuming interrupted analysis");
        self.transition(Phase::CacheMiss, &key);
        let params = marker.request_params.params;
        self.issue(session, key, params, true, claim).await.map(Some)
    }

    fn claim(&self, key: &ContentKey) -> Option<FlightClaim<'_>> {
        let mut claims = lock(&self.claims);
        if !claims.insert(key.clone()) {
            return None;
        }
        Some(FlightClaim {
            claims: &self.claims,
            key: key.clone(),
        })
    }

    async fn issue(
        &self,
        session: UploadSession,
        key: ContentKey,
        params: AnalyzeParams,
        resumed: bool,
        _claim: FlightClaim<'_>,
    ) -> Result<Outcome, CoordinatorError> {
        self.markers.begin(&key, &params);
        self.transition(Phase::InFlight, &key);
        info!(%key, model = %params.model, resumed, "requesting analysis");

        let request = InferenceRequest {
            image: session.image,
            file_name: session.file_name,
            mime_type: session.mime_type,
            params,
        };
        let settled =
            tokio::time::timeout(self.config.timeout, self.endpoint.analyze(request)).await;

        let response = match settled {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(self.fail(&key, e.into())),
            Err(_) => return Err(self.fail(&key, CoordinatorError::Timeout(self.config.timeout))),
        };

        let entry = self.cache.put(&key, response.result, response.detections);
        let source = match &entry.result.provider {
            Some(provider) => format!("endpoint:{}", provider.name),
            None => "endpoint".to_string(),
        };
        self.publisher
            .publish(&LastDiagnosis::from_result(&entry.result, source));
        self.markers.settle(&key);

        info!(%key, label = %entry.result.label, confidence = entry.result.confidence, "analysis succeeded");
        self.finish(Phase::Succeeded, &key, Some(entry.clone()), None);
        Ok(Outcome::Fresh(entry))
    }

    fn serve_hit(&self, entry: CacheEntry) -> Outcome {
        self.publisher
            .publish(&LastDiagnosis::from_result(&entry.result, "cache"));
        info!(key = %entry.key, label = %entry.result.label, "served from cache");
        self.finish(Phase::CacheHit, &entry.key, Some(entry.clone()), None);
        Outcome::CacheHit(entry)
    }

    fn fail(&self, key: &ContentKey, err: CoordinatorError) -> CoordinatorError {
        self.markers.settle(key);
        warn!(%key, error = %err, "analysis failed");
        self.finish(Phase::Failed, key, None, Some(err.to_string()));
        err
    }

    fn transition(&self, phase: Phase, key: &ContentKey) {
        debug!(%key, ?phase, "transition");
        let mut state = lock(&self.state);
        state.phase = phase;
        state.key = Some(key.clone());
        state.entry = None;
        state.error = None;
    }

    fn finish(
        &self,
        phase: Phase,
        key: &ContentKey,
        entry: Option<CacheEntry>,
        error: Option<String>,
    ) {
        debug!(%key, ?phase, "transition");
        *lock(&self.state) = CoordinatorState {
            phase,
            key: Some(key.clone()),
            entry,
            error,
        };
    }
}
