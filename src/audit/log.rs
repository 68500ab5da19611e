//! The audit sink: builds, encrypts and appends one event record per call.

use std::sync::Arc;

use chrono::Local;

use crate::access::Session;
use crate::crypto::Cipher;
use crate::storage::FileStore;
use crate::validation::Record;

/// Byte budget for the activity and details fields. Truncation is by bytes
/// but never splits a multi-byte character.
pub const DETAIL_BYTE_BUDGET: usize = 100;

/// Placeholder stored when no details are supplied.
pub const EMPTY_DETAILS_PLACEHOLDER: &str = "(no details)";

/// Append-only encrypted event sink with a separate unreviewed-suspicious
/// index store.
#[derive(Debug, Clone)]
pub struct AuditLog {
    primary: FileStore,
    suspicious: FileStore,
}

impl AuditLog {
    pub fn open(
        cipher: Arc<Cipher>,
        primary_path: impl AsRef<std::path::Path>,
        suspicious_path: impl AsRef<std::path::Path>,
    ) -> Self {
        Self {
            primary: FileStore::new(primary_path, Arc::clone(&cipher)),
            suspicious: FileStore::new(suspicious_path, cipher),
        }
    }

    /// Records one event.
    ///
    /// No-op when `activity` is empty. Empty `details` becomes a fixed
    /// placeholder. Both fields have control characters replaced by spaces
    /// and are truncated to [`DETAIL_BYTE_BUDGET`]. Storage failures are
    /// reported to stderr and swallowed: auditing must never abort the
    /// operation being audited.
    pub fn log(&self, actor: Option<&Session>, activity: &str, details: &str, suspicious: bool) {
        if activity.is_empty() {
            return;
        }
        let details = if details.is_empty() {
            EMPTY_DETAILS_PLACEHOLDER
        } else {
            details
        };

        // One clock read for both fields, so date and time cannot skew.
        let now = Local::now();
        let record = Record::from([
            ("date".to_string(), now.format("%Y-%m-%d").to_string()),
            ("time".to_string(), now.format("%H:%M:%S").to_string()),
            ("activity".to_string(), clamp(activity)),
            ("details".to_string(), clamp(details)),
            (
                "username".to_string(),
                actor.map(|s| s.username().to_string()).unwrap_or_default(),
            ),
            (
                "suspicious".to_string(),
                if suspicious { "Y" } else { "N" }.to_string(),
            ),
        ]);

        // Encrypt once; the suspicious store receives the identical
        // ciphertext line, not a re-encryption of the same plaintext.
        let line = match self.primary.encode(&record) {
            Ok(line) => line,
            Err(err) => {
                eprintln!("audit log write failed: {err}");
                return;
            }
        };
        if let Err(err) = self.primary.append_line(&line) {
            eprintln!("audit log write failed: {err}");
        }
        if suspicious {
            if let Err(err) = self.suspicious.append_line(&line) {
                eprintln!("suspicious log write failed: {err}");
            }
        }
    }

    /// Path of the primary log store.
    pub fn primary_path(&self) -> &std::path::Path {
        self.primary.path()
    }

    /// Path of the unreviewed-suspicious store.
    pub fn suspicious_path(&self) -> &std::path::Path {
        self.suspicious.path()
    }
}

/// Replaces control characters with spaces and truncates to the byte budget
/// one character at a time, so a multi-byte character is never split.
fn clamp(value: &str) -> String {
    let mut cleaned: String = value
        .chars()
        .map(|c| if (c as u32) < 32 { ' ' } else { c })
        .collect();
    while cleaned.len() > DETAIL_BYTE_BUDGET {
        cleaned.pop();
    }
    cleaned
}
