//! # Crypto
//!
//! The symmetric cipher and hashing collaborators.
//!
//! ## Invariants
//! - CRYPT-1: Key material is generated exactly once and persisted to a key file
//! - CRYPT-2: Passwords are only stored as Argon2id hashes
//! - CRYPT-3: All secret comparisons are constant-time

mod cipher;
mod errors;
mod hashing;

pub use cipher::Cipher;
pub use errors::{CryptoError, CryptoResult};
pub use hashing::{
    constant_time_str_eq, hash_data, hash_password, temp_password, verify_password,
};
