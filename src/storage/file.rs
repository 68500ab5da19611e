//! # Encrypted Line Store
//!
//! One logical record per physical line: each line is the symmetric-cipher
//! encryption of the record's JSON serialization. Records never contain raw
//! newlines (the control-character rule guarantees this), so the file can
//! always be re-split on newline.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::crypto::Cipher;
use crate::validation::Record;

use super::backend::{Decoded, Row, StorageBackend};
use super::errors::StorageResult;

/// Line-oriented encrypted file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    cipher: Arc<Cipher>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>, cipher: Arc<Cipher>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cipher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypts a record to its stored line form without writing it, so a
    /// caller can append the identical ciphertext to more than one store.
    pub fn encode(&self, record: &Record) -> StorageResult<String> {
        let json = serde_json::to_string(record)?;
        Ok(self.cipher.encrypt(&json)?)
    }

    /// Appends an already-encoded line verbatim.
    pub fn append_line(&self, line: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn decode(&self, line: &str) -> Decoded {
        let corrupt = |reason: String| Decoded::Corrupt {
            reason,
            raw: Some(line.to_string()),
        };
        let json = match self.cipher.decrypt(line) {
            Ok(json) => json,
            Err(err) => return corrupt(format!("decryption failed: {err}")),
        };
        match serde_json::from_str::<Record>(&json) {
            Ok(record) => Decoded::Ok(record),
            Err(err) => corrupt(format!("parse failed: {err}")),
        }
    }
}

impl StorageBackend for FileStore {
    fn list(&self) -> StorageResult<Vec<Row>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| Row {
                position: index + 1,
                decoded: self.decode(line),
            })
            .collect())
    }

    fn append(&self, record: &Record) -> StorageResult<()> {
        self.append_line(&self.encode(record)?)
    }

    fn rewrite(&self, rows: &[Row]) -> StorageResult<()> {
        let mut content = String::new();
        for row in rows {
            let line = match &row.decoded {
                Decoded::Ok(record) => self.encode(record)?,
                // An undecodable line is kept verbatim, never dropped by an
                // unrelated mutation.
                Decoded::Corrupt { raw: Some(line), .. } => line.clone(),
                Decoded::Corrupt { raw: None, .. } => continue,
            };
            content.push_str(&line);
            content.push('\n');
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}
