//! Deterministic in-memory guard doubles for tests.

use crate::config::RateLimiterConfig;
use crate::error::Result;
use crate::providers::{RateLimiter, ReplayGuard};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory replay guard with real TTL semantics.
#[derive(Default)]
pub struct InMemoryReplayGuard {
    claims: Mutex<HashMap<String, Instant>>,
}

impl InMemoryReplayGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayGuard for InMemoryReplayGuard {
    fn claim<'a>(
        &'a self,
        token_id: &'a str,
        ttl_seconds: i64,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            if ttl_seconds <= 0 {
                return Ok(false);
            }
            let now = Instant::now();
            #[allow(clippy::unwrap_used)] // Mutex poisoning only happens after a test panic
            let mut claims = self.claims.lock().unwrap();
            claims.retain(|_, expires| *expires > now);
            if claims.contains_key(token_id) {
                return Ok(false);
            }
            #[allow(clippy::cast_sign_loss)] // ttl_seconds > 0 checked above
            claims.insert(
                token_id.to_string(),
                now + Duration::from_secs(ttl_seconds as u64),
            );
            Ok(true)
        })
    }
}

/// In-memory fixed-window rate limiter.
pub struct InMemoryRateLimiter {
    config: RateLimiterConfig,
    windows: Mutex<HashMap<String, (i64, Instant)>>,
}

impl InMemoryRateLimiter {
    /// Create a limiter with the given config.
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn admit<'a>(
        &'a self,
        actor_key: &'a str,
        route_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            if !self.config.enabled {
                return Ok(true);
            }
            let key = format!("rl:{route_key}:{actor_key}");
            let now = Instant::now();
            #[allow(clippy::unwrap_used)] // Mutex poisoning only happens after a test panic
            let mut windows = self.windows.lock().unwrap();
            #[allow(clippy::cast_sign_loss)]
            let window = Duration::from_secs(self.config.window_seconds.max(0) as u64);
            let entry = windows.entry(key).or_insert((0, now));
            // The window boundary is fixed at the first increment and
            // not refreshed afterwards.
            if now.duration_since(entry.1) >= window {
                *entry = (0, now);
            }
            entry.0 += 1;
            Ok(entry.0 <= self.config.max_requests)
        })
    }
}
