//! Error types for attendance and leaderboard operations.

use thiserror::Error;

/// Result type alias for leaderboard operations.
pub type Result<T> = std::result::Result<T, LeaderboardError>;

/// Failures of the aggregation and rank paths.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// The caller lacks the capability for this operation.
    #[error("Not permitted for this organisation")]
    Forbidden,

    /// Database failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for LeaderboardError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
