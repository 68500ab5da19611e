//! # Login Attempt Counter
//!
//! A small side file holding the remaining permitted login attempts as a
//! plain integer. Reset to the configured maximum on successful login,
//! decremented on failure. Once exhausted, only out-of-band intervention
//! (deleting or rewriting the file) re-enables login.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default maximum number of consecutive failed logins.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

#[derive(Debug)]
pub struct LoginAttempts {
    path: PathBuf,
    max: u32,
}

impl LoginAttempts {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max: MAX_LOGIN_ATTEMPTS,
        }
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    /// Remaining attempts; a missing or unreadable file counts as a fresh
    /// maximum.
    pub fn remaining(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(self.max)
    }

    pub fn exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Records a failed login, returning the attempts left.
    pub fn record_failure(&self) -> io::Result<u32> {
        let left = self.remaining().saturating_sub(1);
        fs::write(&self.path, left.to_string())?;
        Ok(left)
    }

    /// Resets the counter after a successful login.
    pub fn reset(&self) -> io::Result<()> {
        fs::write(&self.path, self.max.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_counts_as_full() {
        let tmp = TempDir::new().unwrap();
        let attempts = LoginAttempts::open(tmp.path().join(".login-attempts"));
        assert_eq!(attempts.remaining(), MAX_LOGIN_ATTEMPTS);
        assert!(!attempts.exhausted());
    }

    #[test]
    fn test_failures_decrement_until_exhausted() {
        let tmp = TempDir::new().unwrap();
        let attempts = LoginAttempts::open(tmp.path().join(".login-attempts")).with_max(2);

        assert_eq!(attempts.record_failure().unwrap(), 1);
        assert_eq!(attempts.record_failure().unwrap(), 0);
        assert!(attempts.exhausted());
        // Decrementing past zero saturates.
        assert_eq!(attempts.record_failure().unwrap(), 0);
    }

    #[test]
    fn test_reset_restores_maximum() {
        let tmp = TempDir::new().unwrap();
        let attempts = LoginAttempts::open(tmp.path().join(".login-attempts")).with_max(3);

        attempts.record_failure().unwrap();
        attempts.reset().unwrap();
        assert_eq!(attempts.remaining(), 3);
    }

    #[test]
    fn test_garbage_file_counts_as_full() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".login-attempts");
        fs::write(&path, "not a number").unwrap();
        let attempts = LoginAttempts::open(&path);
        assert_eq!(attempts.remaining(), MAX_LOGIN_ATTEMPTS);
    }
}
