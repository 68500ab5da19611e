//! # MemberVault
//!
//! Role-based access control and data validation over flat-file and SQLite
//! persistence for a member-management system.
//!
//! The layers, bottom up:
//!
//! - [`crypto`]: AES-256-GCM line encryption, password hashing, digests.
//! - [`validation`]: composable rules, field definitions, record schemas.
//! - [`access`]: the role tier hierarchy and the explicit session context.
//! - [`storage`]: the line-oriented backend contract, with encrypted-file
//!   and SQLite implementations.
//! - [`audit`]: the append-only activity log with a suspicious-event mirror.
//! - [`repository`]: authorization-aware CRUD wiring all of the above
//!   together, plus the concrete member/user/log entity definitions.
//!
//! Every repository operation receives a [`access::Session`] value; nothing
//! in this crate consults ambient global state to decide what a caller may
//! do.

pub mod access;
pub mod audit;
pub mod crypto;
pub mod repository;
pub mod storage;
pub mod validation;
