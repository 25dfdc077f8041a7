//! Error types for the attendance engine.
//!
//! Portal failures are modelled as [`UpstreamError`] so callers can tell an
//! expired authorization apart from a generic fetch failure without string
//! matching.

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, AttendanceError>;

/// Errors surfaced by the attendance engine.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Bad input: missing or past date, duplicate exclusion, non-future target.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A ledger index that does not exist.
    #[error("no exclusion at index {index} (ledger holds {len})")]
    NotFound { index: usize, len: usize },

    /// The portal fetch failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The fetch was launched before a refresh and its result was dropped.
    #[error("result from session generation {started} superseded by generation {current}")]
    Superseded { started: u64, current: u64 },
}

impl AttendanceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AttendanceError::Validation(message.into())
    }

    /// Returns `true` if the caller should re-authenticate before retrying.
    pub fn is_authorization_expired(&self) -> bool {
        matches!(self, AttendanceError::Upstream(e) if e.is_authorization_expired())
    }
}

/// Errors that can occur when talking to the attendance portal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The session token was rejected (HTTP 401/403).
    #[error("authorization expired: {0}")]
    AuthorizationExpired(String),

    /// The portal returned a non-success response.
    #[error("portal error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("malformed portal response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Returns `true` if this error means the login token is no longer valid.
    pub fn is_authorization_expired(&self) -> bool {
        matches!(self, UpstreamError::AuthorizationExpired(_))
    }
}
