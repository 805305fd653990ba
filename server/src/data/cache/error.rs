//! Cache error types

use thiserror::Error;

/// Failure converting a cached value to or from MessagePack
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to encode cache value: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Failed to decode cache value: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
