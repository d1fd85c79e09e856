use agrolens_store::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Failure saving or clearing the upload session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("refusing to save an empty image")]
    Empty,

    #[error("failed to encode upload session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure reported by the inference endpoint adapter
#[derive(Debug, Clone, Error)]
pub enum EndpointError {
    /// Connection, TLS or request-building failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response that does not match the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors surfaced to the user by an analysis
#[derive(Debug, Clone, Error)]
pub enum CoordinatorError {
    #[error("no image uploaded")]
    NoUpload,

    #[error("image is empty and cannot be analyzed")]
    NotAnalyzable,

    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}
