//! Guard provider traits.
//!
//! These traits are the seams between the check-in flow and the shared
//! store: production uses the Redis stores, tests use the in-memory
//! mocks. All implementations must be `Send + Sync`.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// A TTL-bounded "claim once" store keyed by token id.
pub trait ReplayGuard: Send + Sync {
    /// Atomically and exclusively mark `token_id` as used for
    /// `ttl_seconds`.
    ///
    /// Returns `true` only for the first caller within the window —
    /// including under true concurrency; this must be a single atomic
    /// set-if-absent-with-expiry, never check-then-set. A non-positive
    /// TTL means the token is already expired and is never claimable.
    fn claim<'a>(
        &'a self,
        token_id: &'a str,
        ttl_seconds: i64,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}

/// Fixed-window admission control per (actor, route).
pub trait RateLimiter: Send + Sync {
    /// Count this request against the current window and report
    /// whether it is admitted.
    fn admit<'a>(
        &'a self,
        actor_key: &'a str,
        route_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}
