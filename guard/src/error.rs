//! Error types for guard-store operations.

use thiserror::Error;

/// Result type alias for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Failures talking to the shared guard store.
///
/// A store failure is transient infrastructure trouble; callers on the
/// check-in path fail closed (reject the request), never open.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The store could not be reached or the command failed.
    #[error("Guard store error: {0}")]
    Store(String),
}

impl From<redis::RedisError> for GuardError {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(err.to_string())
    }
}
