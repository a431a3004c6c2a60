//! Check-in recording and flow orchestration.
//!
//! This crate owns the durable check-in record (one per
//! (trail, participant), enforced by the storage layer) and the
//! end-to-end scan pipeline: rate limit → QR verification → replay
//! claim → registration gate → idempotent record → fact publication.
//!
//! See [`flow::CheckinFlow`] for the orchestrator and
//! [`providers::CheckinRecorder`] for the recording contract. In
//! relay-less deployments, [`award::HttpAwardFallback`] replaces the
//! Kafka bus with a synchronous POST to the points service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod award;
pub mod config;
pub mod error;
pub mod flow;
pub mod gate;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod providers;
pub mod stores;

pub use award::HttpAwardFallback;
pub use config::{AwardFallbackConfig, RegistrationGateConfig};
pub use error::{CheckinError, Result};
pub use flow::{CheckinFlow, ScanOutcome};
pub use gate::HttpRegistrationGate;
pub use providers::{CheckinMethod, CheckinRecord, CheckinRecorder, RegistrationGate};
pub use stores::PostgresCheckinStore;
