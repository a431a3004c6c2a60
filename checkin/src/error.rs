//! Error types for the check-in pipeline.

use thiserror::Error;
use trailpass_credential::CredentialError;
use trailpass_guard::GuardError;

/// Result type alias for check-in operations.
pub type Result<T> = std::result::Result<T, CheckinError>;

/// Failures on the check-in path.
///
/// The taxonomy matters to callers: credential and replay failures are
/// definitive rejections (never retried), `RateLimited` carries a
/// retry-later semantic, and `Storage`/`Gate` are transient
/// infrastructure trouble that fails the request closed.
#[derive(Debug, Error)]
pub enum CheckinError {
    /// The actor exceeded the scan rate limit.
    #[error("Rate limit exceeded, retry later")]
    RateLimited,

    /// The presented token failed verification.
    #[error("Token rejected: {0}")]
    Credential(#[from] CredentialError),

    /// The token id was already claimed: a replayed token.
    #[error("Token already used")]
    Replayed,

    /// The participant has no confirmed registration for the trail.
    #[error("Registration not confirmed")]
    NotRegistered,

    /// The caller lacks the capability for this operation.
    #[error("Not permitted for this organisation")]
    Forbidden,

    /// The shared guard store failed; the request fails closed.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The registration-status collaborator failed; fails closed.
    #[error("Registration check unavailable: {0}")]
    Gate(String),

    /// Database failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for CheckinError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
