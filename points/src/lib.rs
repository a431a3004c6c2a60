//! Points ledger, award rules and voucher redemption.
//!
//! The ledger is append-only; balances are derived rows mutated in the
//! same transaction as their ledger append, so the sum of a pair's
//! deltas always equals its balance. Check-in facts arriving from the
//! relay are applied through [`ledger::LedgerEngine`]'s `FactHandler`
//! implementation, which collapses redelivered facts on their
//! idempotency key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod rules;
pub mod types;
pub mod vouchers;

pub use config::PointsConfig;
pub use error::{PointsError, Result};
pub use ledger::LedgerEngine;
pub use rules::{RulePatch, RuleStore};
pub use types::{
    AwardRule, Balance, LedgerEntry, LedgerReason, Redemption, RuleKind, Voucher, VoucherStatus,
};
pub use vouchers::{VoucherPatch, VoucherRedeemer};
