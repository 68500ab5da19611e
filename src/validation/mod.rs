//! # Validation Engine
//!
//! Declarative field/record schemas with composable predicate rules.
//!
//! ## Invariants
//! - VAL-1: Validation collects every failing rule, never short-circuits
//! - VAL-2: A record failing validation is never persisted or returned
//! - VAL-3: Valid values never contain ASCII control characters

pub mod fields;
pub mod prompt;
pub mod rules;
pub mod schema;

pub use fields::{FieldDef, FieldKind};
pub use rules::{ChecksumPolicy, Rule, MAX_FIELD_LEN};
pub use schema::{Record, Schema, ValidationErrors};
