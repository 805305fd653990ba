//! Cache module
//!
//! In-memory caching (moka + dashmap) for user lookups and the
//! fixed-window rate limiter.

mod backend;
mod error;
mod key;
mod memory;
pub mod rate_limiter;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use key::CacheKey;
pub use rate_limiter::{RateLimitBucket, RateLimitResult, RateLimiter};

use memory::InMemoryCache;

/// Cache service providing typed access to cache backend
///
/// Values are stored as MessagePack bytes.
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    pub fn new(max_entries: u64) -> Self {
        tracing::debug!(max_entries, "Initializing in-memory cache");
        Self {
            backend: Arc::new(InMemoryCache::new(max_entries)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Set raw bytes in cache
    pub async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    /// Get a typed value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key).await? {
            Some(bytes) => {
                Ok(Some(rmp_serde::from_slice(&bytes)?))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.set_raw(key, rmp_serde::to_vec(value)?, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(key).await
    }

    /// Delete a key, logging rather than propagating failures
    pub async fn invalidate_key(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key).await
    }

    /// Atomic increment (for rate limiting)
    pub async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError> {
        self.backend.incr(key, ttl).await
    }

    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        self.backend.ttl(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_service_backend_name() {
        assert_eq!(CacheService::new(10).backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_typed_get_set() {
        let service = CacheService::new(1000);

        #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
        struct Entry {
            id: String,
            score: i64,
        }

        let entry = Entry {
            id: "l1".to_string(),
            score: 42,
        };

        service.set("entry:1", &entry, None).await.unwrap();
        let fetched: Option<Entry> = service.get("entry:1").await.unwrap();
        assert_eq!(fetched, Some(entry));
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_decode_error() {
        let service = CacheService::new(1000);
        service
            .set_raw("garbage", vec![0xc1], None)
            .await
            .unwrap();

        let result = service.get::<String>("garbage").await;
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[tokio::test]
    async fn test_invalidate_key() {
        let service = CacheService::new(1000);
        service.set("k", &1u32, None).await.unwrap();

        service.invalidate_key("k").await;
        assert!(!service.exists("k").await.unwrap());
    }
}
