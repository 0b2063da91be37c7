//! Error types for capability adapters.

use thiserror::Error;

use crate::types::ErrorKind;

/// Errors that can occur when calling a capability adapter.
///
/// Adapters must uphold the idempotence contract: a call that returns an
/// error leaves no partial side effect visible to the caller, so every
/// variant is safe to retry from the caller's perspective. Whether a
/// retry is *worthwhile* is a property of the variant (see
/// [`CapabilityError::is_retryable`]).
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The remote service could not be reached.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Authentication with the remote service failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A transcript or payload could not be processed.
    #[error("processing failed: {0}")]
    Processing(String),

    /// Delivery failed transiently and may succeed if retried.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Delivery was rejected outright (e.g. invalid channel); retrying
    /// the same request cannot succeed.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

impl CapabilityError {
    /// The taxonomy kind for this error, used when recording a
    /// [`Failure`](crate::types::Failure).
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapabilityError::Connectivity(_) => ErrorKind::Connectivity,
            CapabilityError::Auth(_) => ErrorKind::Auth,
            CapabilityError::Processing(_) => ErrorKind::Processing,
            CapabilityError::Delivery(_) => ErrorKind::Delivery,
            CapabilityError::Rejected(_) => ErrorKind::Rejected,
        }
    }

    /// Whether retrying the failed call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
