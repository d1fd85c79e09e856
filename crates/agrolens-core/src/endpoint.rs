//! Seam to the remote classification service

use crate::error::EndpointError;
use crate::types::{AnalyzeParams, Detection, DiagnosisResult};
use std::future::Future;
use std::sync::Arc;

/// One image submission
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub image: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub params: AnalyzeParams,
}

/// Parsed, validated endpoint reply
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResponse {
    pub result: DiagnosisResult,
    pub detections: Vec<Detection>,
}

/// Anything that can classify an image.
///
/// The coordinator bounds every call with its own timeout, so implementations
/// need not.
pub trait InferenceEndpoint: Send + Sync {
    fn analyze(
        &self,
        request: InferenceRequest,
    ) -> impl Future<Output = Result<InferenceResponse, EndpointError>> + Send;
}

impl<E: InferenceEndpoint> InferenceEndpoint for Arc<E> {
    fn analyze(
        &self,
        request: InferenceRequest,
    ) -> impl Future<Output = Result<InferenceResponse, EndpointError>> + Send {
        self.as_ref().analyze(request)
    }
}
