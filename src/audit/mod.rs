//! # Audit Log
//!
//! Append-only, encrypted, structured event sink.
//!
//! ## Invariants
//! - AUD-1: Entries are append-only; nothing updates or deletes them
//! - AUD-2: Logging never aborts the caller; write failures are swallowed
//!   after being reported to stderr
//! - AUD-3: A suspicious entry is mirrored to the unreviewed-suspicious
//!   store; reviewing that store never touches the primary log

mod log;

pub use log::{AuditLog, DETAIL_BYTE_BUDGET, EMPTY_DETAILS_PLACEHOLDER};
