//! Key generation and hashing helpers

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length in bytes of an HS256 session signing key
pub const SIGNING_KEY_LEN: usize = 32;

/// Random HS256 key, used when no JWT secret is configured
pub fn generate_signing_key() -> Vec<u8> {
    let mut key = vec![0u8; SIGNING_KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Lowercase hex SHA-256 digest; migration checksums are stored in this form
pub fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}
