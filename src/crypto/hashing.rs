//! # Hashing Utilities
//!
//! Password hashing and digest helpers.
//!
//! ## Invariants
//! - CRYPT-2: Passwords only stored as Argon2id hashes (salted digests)
//! - CRYPT-3: Constant-time comparison for all secrets

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::errors::{CryptoError, CryptoResult};

/// Hash arbitrary data with SHA-256, returned as lowercase hex.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password into a salted digest (Argon2id PHC string).
pub fn hash_password(password: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CryptoError::HashingFailed)
}

/// Verify a password against its salted digest.
pub fn verify_password(password: &str, salted_digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(salted_digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Constant-time comparison of two strings.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

const TEMP_PASSWORD_LEN: usize = 12;
const TEMP_PASSWORD_CHARSET: &[u8] =
    b"qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM0123456789";

/// Generate a temporary password.
///
/// The result contains no special characters, so it fails the full password
/// policy and forces the user to pick a new password at next login.
pub fn temp_password() -> String {
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN)
        .map(|_| TEMP_PASSWORD_CHARSET[rng.gen_range(0..TEMP_PASSWORD_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_data_is_deterministic_hex() {
        let a = hash_data(b"hello");
        let b = hash_data(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, hash_data(b"hello!"));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("Very_secret_1!").unwrap();
        assert_ne!(hash, "Very_secret_1!");
        assert!(verify_password("Very_secret_1!", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same password", &a));
        assert!(verify_password("same password", &b));
    }

    #[test]
    fn test_verify_rejects_garbage_digest() {
        assert!(!verify_password("anything", "not a digest"));
    }

    #[test]
    fn test_temp_password_shape() {
        let pw = temp_password();
        assert_eq!(pw.len(), 12);
        // Alphanumeric only: deliberately fails the special-character rule.
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(temp_password(), temp_password());
    }

    #[test]
    fn test_constant_time_comparison() {
        assert!(constant_time_str_eq("token", "token"));
        assert!(!constant_time_str_eq("token", "token!"));
        assert!(!constant_time_str_eq("token", "nekot"));
    }
}
