//! # Storage Backend Contract
//!
//! Backends expose whole-store reads and writes: the repository core reads
//! everything, edits in memory and rewrites. This read-modify-rewrite
//! sequence is safe for a single-user terminal session and is an explicit
//! scope limit, not a locking strategy.

use crate::validation::Record;

use super::errors::StorageResult;

/// Outcome of decoding one stored row. Corruption is data, not a fault:
/// callers skip and report corrupt rows without failing the whole listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Ok(Record),
    /// Undecodable row. `raw` carries the stored form verbatim when the
    /// backend can reproduce it, so a rewrite keeps the line for later
    /// inspection or recovery instead of silently dropping it.
    Corrupt { reason: String, raw: Option<String> },
}

/// One stored row with its stable 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub position: usize,
    pub decoded: Decoded,
}

impl Row {
    /// A successfully decoded row.
    pub fn ok(position: usize, record: Record) -> Self {
        Self {
            position,
            decoded: Decoded::Ok(record),
        }
    }
}

/// Persistence adapter contract for the repository core.
pub trait StorageBackend {
    /// Reads every row in stable order. A store that does not exist yet
    /// lists as empty.
    fn list(&self) -> StorageResult<Vec<Row>>;

    /// Appends one record to the end of the store.
    fn append(&self, record: &Record) -> StorageResult<()>;

    /// Replaces the whole store contents with the given rows, in order.
    /// Corrupt rows whose stored form is known are written back verbatim.
    fn rewrite(&self, rows: &[Row]) -> StorageResult<()>;
}
