//! Error types for the crypto module.

use thiserror::Error;

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Cipher and hashing errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key file could not be read or written
    #[error("key file error: {0}")]
    KeyFile(#[from] std::io::Error),

    /// Key file exists but does not contain valid key material
    #[error("key file does not contain valid key material")]
    InvalidKeyMaterial,

    /// Ciphertext is not valid base64
    #[error("ciphertext decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Encryption failed
    #[error("encryption failed")]
    EncryptFailed,

    /// Decryption failed (wrong key, truncated or tampered ciphertext)
    #[error("decryption failed")]
    DecryptFailed,

    /// Decrypted bytes are not valid UTF-8
    #[error("decrypted data is not valid UTF-8")]
    NotUtf8,

    /// Password hashing failed
    #[error("password hashing failed")]
    HashingFailed,
}
