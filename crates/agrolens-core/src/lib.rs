//! Content-addressed diagnosis cache and resumable single-flight analysis

mod cache;
mod config;
mod coordinator;
mod endpoint;
mod error;
mod key;
mod marker;
mod publisher;
mod record;
mod session;
mod types;

pub use cache::ResultCache;
pub use config::Config;
pub use coordinator::{CoordinatorState, Outcome, Phase, RequestCoordinator};
pub use endpoint::{InferenceEndpoint, InferenceRequest, InferenceResponse};
pub use error::{CoordinatorError, EndpointError, SessionError};
pub use key::ContentKey;
pub use marker::{InFlightMarker, MarkerParams, MarkerStore};
pub use publisher::LastDiagnosisPublisher;
pub use session::{UploadSession, UploadStore};
pub use types::{
    AnalyzeParams, CacheEntry, Category, Detection, DiagnosisResult, LastDiagnosis, Prediction,
    Provider, Severity,
};
