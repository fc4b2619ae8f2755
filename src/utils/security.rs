//! Security Utilities
//!
//! Password and security-answer hashing, constant-time comparison, and
//! opaque session-token generation.

use bcrypt::{hash, verify, DEFAULT_COST};
use rand::{distributions::Alphanumeric, Rng};

/// Default bcrypt cost for hashing passwords and security answers
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Length of generated session identifiers
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Hash a secret (password or security answer) using bcrypt
pub fn hash_secret(secret: &str) -> Result<String, bcrypt::BcryptError> {
    hash_secret_with_cost(secret, DEFAULT_BCRYPT_COST)
}

/// Hash a secret with a custom bcrypt cost
pub fn hash_secret_with_cost(secret: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(secret, cost)
}

/// Verify a secret against its stored hash; bcrypt's comparison is
/// constant-time with respect to the hash contents
pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(secret, stored_hash)
}

/// Timing-safe equality for two user-supplied secrets (e.g. an answer and
/// its re-entry confirmation)
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}

/// Generate an opaque session identifier
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
