//! Password hashing with PBKDF2-HMAC-SHA512
//!
//! Credentials are stored as a (digest, salt) pair of hex strings. The salt
//! is generated per account; the digest is derived with a deliberately slow
//! iterated KDF so offline brute force stays expensive.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Salt length in raw bytes (hex-encoded to twice this).
pub const SALT_LEN: usize = 16;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 120_000;

/// Derived digest length in bytes.
pub const DIGEST_LEN: usize = 64;

/// Fixed salt used to equalize the cost of login attempts against accounts
/// that do not exist.
const BURN_SALT: [u8; SALT_LEN] = [0x42; SALT_LEN];

/// Generate a new random salt as a hex string.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, &mut digest);
    digest
}

fn decode_salt(salt: &str) -> Result<Vec<u8>, AuthError> {
    if salt.is_empty() {
        return Err(AuthError::PasswordHash("empty salt".to_string()));
    }
    hex::decode(salt).map_err(|_| AuthError::PasswordHash("salt is not valid hex".to_string()))
}

/// Hash a password with the given salt.
///
/// Deterministic: the same (password, salt) pair always yields the same
/// digest. Empty inputs are rejected before any derivation work.
pub fn hash_password(password: &str, salt: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::PasswordHash("empty password".to_string()));
    }
    let salt_bytes = decode_salt(salt)?;
    Ok(hex::encode(derive(password, &salt_bytes, PBKDF2_ITERATIONS)))
}

/// Verify a password against a stored digest and salt.
///
/// The comparison is constant time with respect to the digest contents.
pub fn verify_password(password: &str, stored_digest: &str, salt: &str) -> Result<bool, AuthError> {
    if password.is_empty() {
        return Err(AuthError::PasswordHash("empty password".to_string()));
    }
    let salt_bytes = decode_salt(salt)?;
    let stored = hex::decode(stored_digest)
        .map_err(|_| AuthError::PasswordHash("stored digest is not valid hex".to_string()))?;

    let computed = derive(password, &salt_bytes, PBKDF2_ITERATIONS);
    if stored.len() != computed.len() {
        return Ok(false);
    }
    Ok(computed.ct_eq(&stored).into())
}

/// Burn one derivation's worth of CPU and discard the result.
///
/// Called on login when no credential record matches, so a missing account
/// costs the same as a wrong password.
pub fn burn(password: &str) {
    let _ = derive(password, &BURN_SALT, PBKDF2_ITERATIONS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // Full-strength derivation is intentionally slow; the property tests
    // below drive `derive` directly with a small iteration count.
    const TEST_ITERATIONS: u32 = 32;

    #[test]
    fn test_roundtrip() {
        let salt = generate_salt();
        let digest = hash_password("correct horse", &salt).unwrap();
        assert!(verify_password("correct horse", &digest, &salt).unwrap());
        assert!(!verify_password("wrong horse", &digest, &salt).unwrap());
    }

    #[test]
    fn test_deterministic() {
        let salt = generate_salt();
        assert_eq!(
            hash_password("p@ssw0rd", &salt).unwrap(),
            hash_password("p@ssw0rd", &salt).unwrap()
        );
    }

    #[test]
    fn test_salt_changes_digest() {
        let a = hash_password("p@ssw0rd", &generate_salt()).unwrap();
        let b = hash_password("p@ssw0rd", &generate_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_salt_length_and_uniqueness() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let salt = generate_salt();
            assert_eq!(salt.len(), SALT_LEN * 2);
            assert!(seen.insert(salt));
        }
    }

    #[test]
    fn test_no_collisions_over_random_pairs() {
        let mut digests = HashSet::new();
        for i in 0..1000 {
            let salt = generate_salt();
            let salt_bytes = hex::decode(&salt).unwrap();
            let digest = derive(&format!("password-{i}"), &salt_bytes, TEST_ITERATIONS);
            assert!(digests.insert(digest.to_vec()));
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let salt = generate_salt();
        assert!(hash_password("", &salt).is_err());
        assert!(hash_password("pw", "").is_err());
        assert!(verify_password("", "aa", &salt).is_err());
        assert!(verify_password("pw", "aa", "not-hex").is_err());
    }

    #[test]
    fn test_digest_length() {
        let digest = hash_password("pw", &generate_salt()).unwrap();
        assert_eq!(digest.len(), DIGEST_LEN * 2);
    }
}
