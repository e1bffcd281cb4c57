//! Error types for the recursive ACL propagation engine.

use thiserror::Error;

/// Errors raised by a walk endpoint while advancing a recursive ACL walk.
///
/// A batch call either succeeds with a `BatchOutcome` or fails with one of
/// these. Per-entry failures under continue-on-failure are *not* errors; they
/// are data on the outcome.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed endpoint response: {0}")]
    MalformedResponse(String),

    #[error("service rejected batch (status {status}): {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl EndpointError {
    /// True when the endpoint itself aborted the batch, as opposed to the
    /// call never completing.
    pub fn is_service_abort(&self) -> bool {
        matches!(self, EndpointError::Service { .. })
    }
}

/// Errors surfaced to callers of the recursive change operations.
#[derive(Debug, Error)]
pub enum AclError {
    /// The run aborted: either the transport failed or the service refused a
    /// batch (e.g. an entry failed while continue-on-failure was off). The
    /// wrapped cause is the only way to tell the two apart.
    #[error("recursive ACL change failed: {source}")]
    ChangeFailed {
        #[source]
        source: EndpointError,
    },

    /// The request was rejected locally, before any remote call was made.
    #[error("invalid run request: {0}")]
    InvalidRequest(String),
}

impl From<EndpointError> for AclError {
    fn from(source: EndpointError) -> Self {
        AclError::ChangeFailed { source }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
