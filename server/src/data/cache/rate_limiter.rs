//! Rate limiter using cache backend
//!
//! Fixed window counter: the window opens with the first request from an
//! identifier and resets once the window duration has elapsed. Up to twice
//! the limit can pass across a window boundary.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::CacheService;
use super::key::CacheKey;

/// Rate limit bucket configuration
#[derive(Debug, Clone)]
pub struct RateLimitBucket {
    /// Bucket name used in the counter key
    pub name: &'static str,
    /// Maximum requests per window
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitBucket {
    /// General API bucket
    pub fn api(max_requests: u32, window_secs: u64) -> Self {
        Self {
            name: "api",
            max_requests,
            window_secs,
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests remaining in window
    pub remaining: u32,
    pub limit: u32,
    /// Unix timestamp when window resets
    pub reset_at: u64,
    /// Seconds until retry (only if blocked)
    pub retry_after: Option<u64>,
}

/// Rate limiter using cache backend
pub struct RateLimiter {
    cache: Arc<CacheService>,
}

impl RateLimiter {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }

    /// Count a request for identifier in bucket and report the window state
    pub async fn check(&self, bucket: &RateLimitBucket, identifier: &str) -> RateLimitResult {
        let key = CacheKey::rate_limit(bucket.name, identifier);
        let window = Duration::from_secs(bucket.window_secs);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "System clock is before UNIX epoch");
                0
            });

        let count = match self.cache.incr(&key, Some(window)).await {
            Ok(c) => c,
            Err(e) => {
                // Fail open: a cache fault must not take the API down
                tracing::error!(
                    bucket = bucket.name,
                    %identifier,
                    error = %e,
                    "Rate limit cache increment failed, allowing request"
                );
                1
            }
        };

        let limit = bucket.max_requests;
        let allowed = count <= i64::from(limit);
        let remaining = i64::from(limit)
            .saturating_sub(count)
            .try_into()
            .unwrap_or(0u32);

        let ttl = self.cache.ttl(&key).await.ok().flatten();
        let reset_at = now.saturating_add(ttl.map_or(bucket.window_secs, |d| d.as_secs()));

        tracing::trace!(
            bucket = bucket.name,
            %identifier,
            count,
            limit,
            allowed,
            "Rate limit check"
        );

        RateLimitResult {
            allowed,
            remaining,
            limit,
            reset_at,
            retry_after: (!allowed).then(|| reset_at.saturating_sub(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(CacheService::new(1000)))
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let limiter = limiter();
        let bucket = RateLimitBucket::api(5, 60);

        for i in 0..5 {
            let result = limiter.check(&bucket, "192.168.1.1").await;
            assert!(result.allowed, "Request {} should be allowed", i);
            assert!(result.retry_after.is_none());
        }

        let result = limiter.check(&bucket, "192.168.1.1").await;
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.retry_after.is_some());
    }

    #[tokio::test]
    async fn test_identifiers_are_independent() {
        let limiter = limiter();
        let bucket = RateLimitBucket::api(1, 60);

        assert!(limiter.check(&bucket, "10.0.0.1").await.allowed);
        assert!(!limiter.check(&bucket, "10.0.0.1").await.allowed);
        assert!(limiter.check(&bucket, "10.0.0.2").await.allowed);
    }

    #[tokio::test]
    async fn test_result_fields() {
        let limiter = limiter();
        let bucket = RateLimitBucket::api(100, 900);

        let result = limiter.check(&bucket, "192.168.1.1").await;
        assert!(result.allowed);
        assert_eq!(result.limit, 100);
        assert_eq!(result.remaining, 99);
        assert!(result.reset_at > 0);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = limiter();
        let bucket = RateLimitBucket {
            name: "short",
            max_requests: 1,
            window_secs: 1,
        };

        assert!(limiter.check(&bucket, "ip").await.allowed);
        assert!(!limiter.check(&bucket, "ip").await.allowed);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.check(&bucket, "ip").await.allowed);
    }
}
