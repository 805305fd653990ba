//! Cache backend trait definition

use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;

/// Cache backend trait
///
/// Operations on individual keys are atomic. Return values of `delete` and
/// `exists` are best-effort under concurrent access.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Set a value in the cache with optional TTL
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Returns `true` if the key existed before deletion
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Atomic increment; the window TTL is set when the counter is created
    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError>;

    /// Remaining lifetime of a counter or entry
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}
