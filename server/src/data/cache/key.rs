//! Type-safe cache key builder with versioning

use crate::core::constants::CACHE_KEY_VERSION;

/// Type-safe cache key builder
///
/// Entity keys are prefixed with a version (e.g., "v1:") so a schema change
/// can invalidate everything cached under the old layout.
pub struct CacheKey;

impl CacheKey {
    /// Cache key for user by ID
    pub fn user(id: &str) -> String {
        format!("{}:user:{}", CACHE_KEY_VERSION, id)
    }

    /// Cache key for negative user lookup by ID (not found)
    pub fn user_negative(id: &str) -> String {
        format!("{}:user:neg:{}", CACHE_KEY_VERSION, id)
    }

    /// Cache key for a rate limit counter
    ///
    /// Not versioned. Identifiers are client IPs, which never contain `:`
    /// in a way that collides with the bucket prefix.
    pub fn rate_limit(bucket: &str, identifier: &str) -> String {
        format!("rl:{}:{}", bucket, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keys() {
        assert_eq!(CacheKey::user("u123"), "v1:user:u123");
        assert_eq!(CacheKey::user_negative("u123"), "v1:user:neg:u123");
    }

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(
            CacheKey::rate_limit("api", "192.168.1.1"),
            "rl:api:192.168.1.1"
        );
    }
}
