//! Error types for metadata and host lookups.

use thiserror::Error;

/// Errors that can occur when querying metadata services or the local host.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No cloud provider answered its sentinel probe.
    #[error("not a recognized cloud provider")]
    NotDetected,

    /// The metadata path returned 404, or the value does not exist here.
    #[error("not found")]
    NotFound,

    /// Request timed out.
    #[error("request timeout")]
    Timeout,

    /// Connection, DNS, or body read failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON deserialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from the local resolver or interface enumeration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Field or operation not supported for this provider.
    #[error("operation not supported for this provider")]
    NotSupported,
}

impl MetadataError {
    /// Whether this error only signals an absent value.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::NotFound)
    }
}
