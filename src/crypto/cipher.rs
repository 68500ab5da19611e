//! # Symmetric Cipher
//!
//! AES-256-GCM encryption for records at rest. The key is loaded from a key
//! file on first use; if the file does not exist yet, fresh key material is
//! generated and persisted so subsequent runs reuse it.
//!
//! Ciphertext framing is `base64(nonce || ciphertext)` on a single line,
//! which keeps encrypted records safe for newline-delimited storage.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::{CryptoError, CryptoResult};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Symmetric cipher with file-persisted key material.
#[derive(Clone)]
pub struct Cipher {
    key: [u8; KEY_LEN],
    key_path: PathBuf,
}

// Key material must never leak through debug formatting.
impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("key", &"<redacted>")
            .field("key_path", &self.key_path)
            .finish()
    }
}

impl Cipher {
    /// Opens the cipher, loading the key from `key_path` or generating and
    /// persisting a new one.
    ///
    /// Returns the cipher and whether new key material was generated, so the
    /// caller can record the one-time generation event.
    pub fn open(key_path: impl AsRef<Path>) -> CryptoResult<(Self, bool)> {
        let key_path = key_path.as_ref().to_path_buf();

        match fs::read_to_string(&key_path) {
            Ok(encoded) => {
                let raw = BASE64.decode(encoded.trim().as_bytes())?;
                let key: [u8; KEY_LEN] = raw
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                Ok((Self { key, key_path }, false))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let mut key = [0u8; KEY_LEN];
                OsRng.fill_bytes(&mut key);
                if let Some(parent) = key_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&key_path, BASE64.encode(key))?;
                Ok((Self { key, key_path }, true))
            }
            Err(err) => Err(CryptoError::KeyFile(err)),
        }
    }

    /// Path of the key file backing this cipher.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Encrypts a plaintext string to a single base64 line.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::EncryptFailed)?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(framed))
    }

    /// Decrypts a base64 line produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> CryptoResult<String> {
        let framed = BASE64.decode(encoded.trim().as_bytes())?;
        if framed.len() < NONCE_LEN {
            return Err(CryptoError::DecryptFailed);
        }
        let (nonce_bytes, ciphertext) = framed.split_at(NONCE_LEN);

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::DecryptFailed)?;
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::NotUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_generated_once_and_reused() {
        let tmp = TempDir::new().unwrap();
        let key_path = tmp.path().join(".vault-key");

        let (cipher, generated) = Cipher::open(&key_path).unwrap();
        assert!(generated);

        let (reopened, generated_again) = Cipher::open(&key_path).unwrap();
        assert!(!generated_again);

        // Same key: ciphertext from one instance decrypts with the other.
        let ct = cipher.encrypt("hello").unwrap();
        assert_eq!(reopened.decrypt(&ct).unwrap(), "hello");
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let tmp = TempDir::new().unwrap();
        let (cipher, _) = Cipher::open(tmp.path().join(".key")).unwrap();

        let plaintext = r#"{"activity":"login","suspicious":"N"}"#;
        let ciphertext = cipher.encrypt(plaintext).unwrap();

        assert_ne!(ciphertext, plaintext);
        assert!(!ciphertext.contains('\n'));
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_nonces_are_unique_per_encryption() {
        let tmp = TempDir::new().unwrap();
        let (cipher, _) = Cipher::open(tmp.path().join(".key")).unwrap();

        let a = cipher.encrypt("same input").unwrap();
        let b = cipher.encrypt("same input").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), cipher.decrypt(&b).unwrap());
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let tmp = TempDir::new().unwrap();
        let (cipher, _) = Cipher::open(tmp.path().join(".key")).unwrap();

        let ct = cipher.encrypt("secret").unwrap();
        let mut raw = BASE64.decode(ct.as_bytes()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let tampered = BASE64.encode(raw);

        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn test_debug_output_redacts_key_material() {
        let tmp = TempDir::new().unwrap();
        let (cipher, _) = Cipher::open(tmp.path().join(".key")).unwrap();

        let shown = format!("{cipher:?}");
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains(&format!("{:?}", cipher.key)));
    }

    #[test]
    fn test_corrupt_key_file_rejected() {
        let tmp = TempDir::new().unwrap();
        let key_path = tmp.path().join(".key");
        std::fs::write(&key_path, "dG9vLXNob3J0").unwrap(); // valid base64, wrong length

        assert!(matches!(
            Cipher::open(&key_path),
            Err(CryptoError::InvalidKeyMaterial)
        ));
    }
}
