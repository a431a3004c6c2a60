//! Redis-backed guard stores.
//!
//! Key layout:
//! - replay guard: `qr:jti:{token_id}` → `"1"`, TTL = remaining token
//!   validity
//! - rate limiter: `rl:{route}:{actor}` → window counter, TTL = window
//!   length, set only on the window's first increment

use crate::config::RateLimiterConfig;
use crate::error::{GuardError, Result};
use crate::providers::{RateLimiter, ReplayGuard};
use redis::aio::ConnectionManager;
use redis::Client;
use std::future::Future;
use std::pin::Pin;

async fn connection_manager(redis_url: &str) -> Result<ConnectionManager> {
    let client = Client::open(redis_url)
        .map_err(|e| GuardError::Store(format!("Failed to create Redis client: {e}")))?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| GuardError::Store(format!("Failed to create Redis connection manager: {e}")))
}

/// Redis-backed replay guard: one `SET … NX EX` per claim.
#[derive(Clone)]
pub struct RedisReplayGuard {
    conn_manager: ConnectionManager,
}

impl RedisReplayGuard {
    /// Create a replay guard.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Store`] if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        Ok(Self {
            conn_manager: connection_manager(redis_url).await?,
        })
    }

    fn replay_key(token_id: &str) -> String {
        format!("qr:jti:{token_id}")
    }
}

impl ReplayGuard for RedisReplayGuard {
    fn claim<'a>(
        &'a self,
        token_id: &'a str,
        ttl_seconds: i64,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            if ttl_seconds <= 0 {
                return Ok(false);
            }

            let mut conn = self.conn_manager.clone();
            let key = Self::replay_key(token_id);

            // SET if Not eXists with EXpire: first caller wins, every
            // other caller within the TTL sees nil.
            let claimed: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg("1")
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds)
                .query_async(&mut conn)
                .await?;

            let first = claimed.is_some();
            tracing::debug!(
                token_id = %token_id,
                ttl_seconds = ttl_seconds,
                first = first,
                "Replay guard claim"
            );
            Ok(first)
        })
    }
}

/// Redis-backed fixed-window rate limiter.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn_manager: ConnectionManager,
    config: RateLimiterConfig,
}

impl RedisRateLimiter {
    /// Create a rate limiter.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Store`] if connection to Redis fails.
    pub async fn new(redis_url: &str, config: RateLimiterConfig) -> Result<Self> {
        Ok(Self {
            conn_manager: connection_manager(redis_url).await?,
            config,
        })
    }

    fn window_key(route_key: &str, actor_key: &str) -> String {
        format!("rl:{route_key}:{actor_key}")
    }
}

impl RateLimiter for RedisRateLimiter {
    fn admit<'a>(
        &'a self,
        actor_key: &'a str,
        route_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            if !self.config.enabled {
                return Ok(true);
            }

            let mut conn = self.conn_manager.clone();
            let key = Self::window_key(route_key, actor_key);

            // Atomic INCR + EXPIRE NX: the expiry is attached when the
            // counter is created and never refreshed afterwards, so a
            // burst cannot hold the window open forever.
            let (count,): (i64,) = redis::pipe()
                .atomic()
                .cmd("INCR")
                .arg(&key)
                .cmd("EXPIRE")
                .arg(&key)
                .arg(self.config.window_seconds)
                .arg("NX")
                .ignore()
                .query_async(&mut conn)
                .await?;

            let admitted = count <= self.config.max_requests;
            if !admitted {
                tracing::warn!(
                    actor = %actor_key,
                    route = %route_key,
                    count = count,
                    max = self.config.max_requests,
                    window_seconds = self.config.window_seconds,
                    "Rate limit exceeded"
                );
            }
            Ok(admitted)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Note: these tests require a running Redis instance
    // Run with: docker run -d -p 6379:6379 redis:7-alpine

    const REDIS_URL: &str = "redis://127.0.0.1:6379";

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn replay_guard_first_claim_wins() {
        let guard = RedisReplayGuard::new(REDIS_URL).await.unwrap();
        let jti = format!("test:{}", uuid::Uuid::new_v4());

        assert!(guard.claim(&jti, 30).await.unwrap());
        assert!(!guard.claim(&jti, 30).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn replay_guard_concurrent_claims_admit_exactly_one() {
        let guard = RedisReplayGuard::new(REDIS_URL).await.unwrap();
        let jti = format!("test:{}", uuid::Uuid::new_v4());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let guard = guard.clone();
            let jti = jti.clone();
            handles.push(tokio::spawn(async move {
                guard.claim(&jti, 30).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn replay_guard_expired_token_is_never_claimable() {
        let guard = RedisReplayGuard::new(REDIS_URL).await.unwrap();
        let jti = format!("test:{}", uuid::Uuid::new_v4());
        assert!(!guard.claim(&jti, 0).await.unwrap());
        assert!(!guard.claim(&jti, -5).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn rate_limiter_blocks_over_limit_and_window_expires() {
        let config = RateLimiterConfig::new()
            .with_window_seconds(2)
            .with_max_requests(3);
        let limiter = RedisRateLimiter::new(REDIS_URL, config).await.unwrap();
        let actor = format!("test:{}", uuid::Uuid::new_v4());

        for _ in 0..3 {
            assert!(limiter.admit(&actor, "checkin.scan").await.unwrap());
        }
        assert!(!limiter.admit(&actor, "checkin.scan").await.unwrap());

        // A denied increment must not refresh the window's expiry.
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(limiter.admit(&actor, "checkin.scan").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn disabled_limiter_admits_everything() {
        let config = RateLimiterConfig::new()
            .with_enabled(false)
            .with_max_requests(0);
        let limiter = RedisRateLimiter::new(REDIS_URL, config).await.unwrap();
        for _ in 0..10 {
            assert!(limiter.admit("anyone", "anywhere").await.unwrap());
        }
    }
}
