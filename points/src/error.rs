//! Error types for ledger and voucher operations.

use thiserror::Error;

/// Result type alias for points operations.
pub type Result<T> = std::result::Result<T, PointsError>;

/// Failures of the ledger and voucher paths.
///
/// `InsufficientBalance` and the voucher variants are definitive
/// rejections; `VoucherExhausted` carries a retry-later-never semantic
/// (the stock will not come back), and `Storage` is transient.
#[derive(Debug, Error)]
pub enum PointsError {
    /// The balance cannot cover the requested debit.
    #[error("Insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance {
        /// Current committed balance.
        balance: i64,
        /// The debit that was requested.
        requested: i64,
    },

    /// A debit or credit of a non-positive amount was requested.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// No voucher with that id.
    #[error("Voucher not found")]
    VoucherNotFound,

    /// The voucher exists but is disabled.
    #[error("Voucher not active")]
    VoucherNotActive,

    /// The voucher's quantity cap is reached.
    #[error("Voucher exhausted")]
    VoucherExhausted,

    /// No rule with that id in the organisation.
    #[error("Rule not found")]
    RuleNotFound,

    /// The caller lacks the capability for this operation.
    #[error("Not permitted for this organisation")]
    Forbidden,

    /// Database failure; the transaction aborted with no partial
    /// effect.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for PointsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
