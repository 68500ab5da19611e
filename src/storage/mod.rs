//! # Storage Backends
//!
//! Persistence adapters behind the repository core's backend contract.
//!
//! ## Invariants
//! - STO-1: One logical record per physical line (file) or row (table)
//! - STO-2: A corrupt row is skipped and reported, never fatal to a listing;
//!   a rewrite keeps its stored form when the backend can reproduce it
//! - STO-3: SQL values are always bound via placeholders

pub mod backend;
pub mod errors;
pub mod file;
pub mod sqlite;

pub use backend::{Decoded, Row, StorageBackend};
pub use errors::{StorageError, StorageResult};
pub use file::FileStore;
pub use sqlite::SqliteStore;
