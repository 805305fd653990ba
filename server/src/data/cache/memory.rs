//! In-memory cache implementation using moka + dashmap
//!
//! moka holds serialized entries with per-entry TTLs; dashmap holds the
//! fixed-window counters used by the rate limiter.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;

use super::backend::CacheBackend;
use super::error::CacheError;

/// Counters are swept every this many increments
const COUNTER_SWEEP_INTERVAL: u64 = 256;

#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    ttl: Option<Duration>,
    created_at: Instant,
}

/// Per-entry expiry tracking for variable TTLs
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

struct Counter {
    count: AtomicI64,
    expires_at: Instant,
}

/// In-memory cache backend
pub struct InMemoryCache {
    cache: Cache<String, CacheEntry>,
    counters: DashMap<String, Counter>,
    ops: AtomicU64,
}

impl InMemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .initial_capacity((max_entries as usize / 4).min(10_000))
            .expire_after(EntryTtl)
            .build();

        Self {
            cache,
            counters: DashMap::new(),
            ops: AtomicU64::new(0),
        }
    }

    fn sweep_counters(&self) {
        let now = Instant::now();
        self.counters.retain(|_, counter| now < counter.expires_at);
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.data))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            data: value,
            ttl,
            created_at: Instant::now(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.contains_key(key))
    }

    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError> {
        use dashmap::mapref::entry::Entry;

        let now = Instant::now();
        let expires_at = now + ttl.unwrap_or(Duration::from_secs(60));

        // The entry guard gives exclusive access, so reset-on-expiry is atomic
        let count = match self.counters.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let counter = occupied.get_mut();
                if now >= counter.expires_at {
                    counter.count.store(1, Ordering::SeqCst);
                    counter.expires_at = expires_at;
                    1
                } else {
                    counter.count.fetch_add(1, Ordering::SeqCst) + 1
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Counter {
                    count: AtomicI64::new(1),
                    expires_at,
                });
                1
            }
        };

        if self
            .ops
            .fetch_add(1, Ordering::Relaxed)
            .is_multiple_of(COUNTER_SWEEP_INTERVAL)
        {
            self.sweep_counters();
        }

        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        if let Some(counter) = self.counters.get(key) {
            let remaining = counter.expires_at.saturating_duration_since(Instant::now());
            return Ok((remaining > Duration::ZERO).then_some(remaining));
        }

        Ok(self.cache.get(key).await.and_then(|entry| {
            entry
                .ttl
                .and_then(|ttl| ttl.checked_sub(entry.created_at.elapsed()))
                .filter(|remaining| *remaining > Duration::ZERO)
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new(100);

        cache.set("key1", b"value1".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("key1").await.unwrap(), Some(b"value1".to_vec()));
        assert!(cache.exists("key1").await.unwrap());

        assert!(cache.delete("key1").await.unwrap());
        assert!(!cache.delete("key1").await.unwrap());
        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_counts_within_window() {
        let cache = InMemoryCache::new(100);
        let ttl = Some(Duration::from_secs(60));

        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 1);
        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 2);
        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_incr_expired_resets() {
        let cache = InMemoryCache::new(100);

        let first = cache
            .incr("counter", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        assert_eq!(first, 1);

        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = cache
            .incr("counter", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(second, 1);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryCache::new(100);

        cache
            .set("key1", b"value1".to_vec(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.exists("key1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining() {
        let cache = InMemoryCache::new(100);

        cache
            .incr("counter", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(cache.ttl("counter").await.unwrap().unwrap() > Duration::from_secs(50));

        cache
            .set("key1", b"v".to_vec(), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        let secs = cache.ttl("key1").await.unwrap().unwrap().as_secs();
        assert!((58..=60).contains(&secs));

        cache.set("forever", b"v".to_vec(), None).await.unwrap();
        assert!(cache.ttl("forever").await.unwrap().is_none());
        assert!(cache.ttl("missing").await.unwrap().is_none());
    }
}
