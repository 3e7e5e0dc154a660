//! Salted password digests.
//!
//! Stored form is `hex(salt)$hex(sha256(salt || password))` with a random
//! 16-byte salt.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Hash a password with a fresh random salt.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!(
        "{}${}",
        hex::encode(salt),
        hex::encode(digest(&salt, password))
    )
}

/// Verify a password against a stored `salt$digest` string.
/// Malformed stored values never verify.
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    digest(&salt, password) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let stored = hash("secret1");
        assert!(verify("secret1", &stored));
        assert!(!verify("secret2", &stored));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        assert_ne!(hash("same"), hash("same"));
    }

    #[test]
    fn malformed_stored_values_never_verify() {
        assert!(!verify("x", ""));
        assert!(!verify("x", "nodollar"));
        assert!(!verify("x", "zz$zz"));
    }
}
