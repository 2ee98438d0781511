use sha2::{Digest, Sha256};

/// Hash a password for storage or comparison.
///
/// Deterministic SHA-256 hex digest (64 chars). The same digest routine is
/// used when creating users and when transforming a login attempt, so
/// verification is a straight string comparison against the stored value.
#[must_use]
pub fn hash_password(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}
