//! Replay guard and fixed-window rate limiter.
//!
//! Both sit on a shared store mutated by many concurrent callers, so
//! both are built on atomic server-side primitives rather than
//! read-modify-write from the caller:
//!
//! - [`ReplayGuard::claim`] is a single `SET … NX EX` — the first
//!   caller within the TTL wins, every other caller (including a
//!   concurrent one) loses.
//! - [`RateLimiter::admit`] is an atomic `INCR` + `EXPIRE … NX`
//!   pipeline — the window's expiry is set exactly once, when the
//!   counter is created, and never refreshed by later increments.
//!
//! Redis-backed stores live in [`stores`]; deterministic in-memory
//! doubles live in [`mocks`] (feature `test-utils`, on by default).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
#[cfg(feature = "test-utils")]
pub mod mocks;
pub mod providers;
pub mod stores;

pub use config::RateLimiterConfig;
pub use error::{GuardError, Result};
pub use providers::{RateLimiter, ReplayGuard};
pub use stores::{RedisRateLimiter, RedisReplayGuard};
