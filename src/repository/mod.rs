//! # Repository Layer
//!
//! Authorization-aware CRUD over a pluggable storage backend. Every
//! operation runs the same skeleton: authorize against the entity's access
//! policy, audit the attempt, fetch current state, merge and field-check,
//! validate against the schema, probe identifier uniqueness, persist,
//! return. No read ever returns an invalid record and no write ever
//! persists one.

mod core;
mod entities;
mod errors;
mod policy;

pub use core::{Page, PartialRecord, Repository};
pub use entities::{
    change_password_schema, log_schema, logs, member_schema, members, suspicious_log_schema,
    suspicious_logs, user_schema, users, DEFAULT_ROLE,
};
pub use errors::{RepoError, RepoResult};
pub use policy::{AccessPolicy, FieldOutcome};
