//! Attendance aggregation and monthly leaderboards.
//!
//! Check-in facts flow into an idempotent attendance table; monthly
//! counters are incremented only when a fact actually created a row,
//! so redeliveries never inflate scores. Ranks are materialised
//! delete-then-insert per (period, scope) by [`rank::RankBuilder`],
//! both on a fixed interval and on demand before reads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod rank;

pub use config::RankBuilderConfig;
pub use error::{LeaderboardError, Result};
pub use ingest::{AttendanceRow, AttendanceStore};
pub use rank::{assign_ranks, RankAssignment, RankBuilder, RankRow};
