//! # Access Policy Contract
//!
//! Each entity type computes a role requirement per operation and per
//! record. The repository core never reads or writes anything without first
//! asking whether the active session satisfies the computed requirement.

use crate::access::{Requirement, Session};

/// Outcome of the field-level policy check on a supplied field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The supplied value stands.
    Keep,
    /// The supplied value is silently replaced; the coercion is audited as
    /// an attempted-vs-enforced mismatch, distinct from a hard denial.
    Coerce { enforced: String },
}

/// Per-entity-type access policy.
pub trait AccessPolicy: Send + Sync {
    /// Requirement to read the record with this id, or to list all records
    /// when `id` is `None`.
    fn can_read(&self, session: &Session, id: Option<&str>) -> Requirement;

    /// Requirement to insert a new record.
    fn can_insert(&self, session: &Session) -> Requirement;

    /// Requirement to update the record with this id.
    fn can_update(&self, session: &Session, id: &str) -> Requirement;

    /// Requirement to delete the record with this id.
    fn can_delete(&self, session: &Session, id: &str) -> Requirement;

    /// Field-level check applied to every supplied field of an insert or
    /// update. `prior` is the stored value for updates, `None` for inserts.
    fn check_field(
        &self,
        _session: &Session,
        _field: &str,
        _prior: Option<&str>,
        _proposed: &str,
    ) -> FieldOutcome {
        FieldOutcome::Keep
    }
}
