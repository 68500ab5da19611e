//! # Repository Core
//!
//! The generic CRUD engine. Every operation follows the same skeleton:
//! authorize, audit the attempt, fetch current state, merge and field-check,
//! validate, probe uniqueness, persist, return. Audit entries are emitted
//! around every decision point, not just failures; unauthorized attempts are
//! always logged as suspicious.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::access::Session;
use crate::audit::AuditLog;
use crate::storage::{Decoded, Row, StorageBackend};
use crate::validation::{Record, Schema, ValidationErrors};

use super::errors::{RepoError, RepoResult};
use super::policy::{AccessPolicy, FieldOutcome};

/// Partial record for updates: absent fields and `None` values both mean
/// "no change".
pub type PartialRecord = BTreeMap<String, Option<String>>;

/// Pagination window over a stable order. The limit counts post-filter
/// results: a page of 20 means 20 visible, valid, readable rows.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: 20 }
    }
}

/// Authorization-aware repository over a pluggable storage backend.
pub struct Repository<B: StorageBackend> {
    schema: Schema,
    policy: Box<dyn AccessPolicy>,
    backend: B,
    audit: Arc<AuditLog>,
}

impl<B: StorageBackend> Repository<B> {
    pub fn new(schema: Schema, policy: Box<dyn AccessPolicy>, backend: B, audit: Arc<AuditLog>) -> Self {
        Self {
            schema,
            policy,
            backend,
            audit,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Lists records the caller may individually read, in stable storage
    /// order, paginated after row-level filtering. The optional search term
    /// matches any field case-insensitively, or the positional row number
    /// exactly (the escape hatch for stores without an identifier field).
    pub fn read_all(
        &self,
        session: &Session,
        page: Page,
        search: Option<&str>,
    ) -> RepoResult<Vec<(String, Record)>> {
        self.authorize(
            session,
            self.policy.can_read(session, None),
            &format!("Unauthorized ReadAll call in {}", self.name()),
        )?;
        let search_note = search.map(|s| format!(", search: '{s}'")).unwrap_or_default();
        self.audit.log(
            Some(session),
            &format!("ReadAll in {}", self.name()),
            &format!("offset: {}, limit: {}{search_note}", page.offset, page.limit),
            false,
        );

        let needle = search.map(str::to_lowercase);
        let mut visible = Vec::new();
        for (position, record) in self.decoded_rows(session)? {
            // Only validated rows are ever returned from a read.
            if let Err(errors) = self.schema.validate(&record) {
                self.log_validation_errors(session, "read invalid data", &errors);
                continue;
            }
            let id = self.record_id(position, &record);
            // Row-level re-check: listing rights do not imply the right to
            // see every row.
            if !session.satisfies(self.policy.can_read(session, Some(&id))) {
                continue;
            }
            if let Some(needle) = &needle {
                if !search_matches(&record, position, needle) {
                    continue;
                }
            }
            visible.push((id, record));
        }

        Ok(visible.into_iter().skip(page.offset).take(page.limit).collect())
    }

    /// Reads one record by identifier (or positional row number when the
    /// schema has no identifier field).
    pub fn read_one(&self, session: &Session, id: &str) -> RepoResult<Record> {
        self.authorize(
            session,
            self.policy.can_read(session, Some(id)),
            &format!("Unauthorized ReadOne call in {}", self.name()),
        )?;
        self.audit.log(
            Some(session),
            &format!("ReadOne in {}", self.name()),
            &format!("id: {id}"),
            false,
        );

        let found = self
            .decoded_rows(session)?
            .into_iter()
            .find(|(position, record)| self.matches_id(id, *position, record));
        let Some((_, record)) = found else {
            self.log_not_found(session, "reading", id);
            return Err(RepoError::NotFound);
        };

        self.validated(session, "read invalid data", &record)?;
        Ok(record)
    }

    /// Inserts a full record as a new row.
    pub fn insert(&self, session: &Session, mut record: Record) -> RepoResult<()> {
        self.authorize(
            session,
            self.policy.can_insert(session),
            &format!("Unauthorized Insert call in {}", self.name()),
        )?;
        self.audit.log(
            Some(session),
            &format!("Insert in {}", self.name()),
            &self.payload_summary(&record),
            false,
        );

        // Field-level policy: supplied values may be coerced.
        let supplied: Vec<String> = record.keys().cloned().collect();
        for field in supplied {
            let proposed = record.get(&field).cloned().unwrap_or_default();
            if let FieldOutcome::Coerce { enforced } =
                self.policy.check_field(session, &field, None, &proposed)
            {
                self.log_coercion(session, &field, &proposed, &enforced);
                record.insert(field, enforced);
            }
        }

        self.validated(session, "insert invalid data", &record)?;

        // Uniqueness probe: a duplicate is distinct from malformed data.
        if let Some(id_field) = self.schema.id_field() {
            let id_value = record.get(id_field).cloned().unwrap_or_default();
            let taken = self
                .decoded_rows(session)?
                .iter()
                .any(|(position, existing)| self.matches_id(&id_value, *position, existing));
            if taken {
                self.audit.log(
                    Some(session),
                    &format!("Attempt to insert duplicate in {}", self.name()),
                    &format!("{id_field} '{id_value}' already exists"),
                    true,
                );
                return Err(RepoError::Duplicate(id_value));
            }
        }

        self.backend
            .append(&record)
            .map_err(|err| self.storage_failure(session, err))
    }

    /// Applies a partial update: unspecified fields keep their prior value.
    /// Any caller-supplied change to the identifier field is a
    /// validation-level error, never a silent update.
    pub fn update(&self, session: &Session, id: &str, changes: &PartialRecord) -> RepoResult<()> {
        self.authorize(
            session,
            self.policy.can_update(session, id),
            &format!("Unauthorized Update call in {} (id: {id})", self.name()),
        )?;
        let changed: Vec<&str> = changes
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(field, _)| field.as_str())
            .collect();
        self.audit.log(
            Some(session),
            &format!("Update in {}", self.name()),
            &format!("id: {id}, fields: {}", changed.join(", ")),
            false,
        );

        let mut rows = self.fetch_rows(session)?;
        let mut target: Option<(usize, Record)> = None;
        for (index, row) in rows.iter().enumerate() {
            if target.is_some() {
                break;
            }
            if let Decoded::Ok(record) = &row.decoded {
                if self.matches_id(id, row.position, record) {
                    target = Some((index, record.clone()));
                }
            }
        }
        let Some((index, mut candidate)) = target else {
            self.log_not_found(session, "updating", id);
            return Err(RepoError::NotFound);
        };
        for (field, value) in changes {
            let Some(value) = value else { continue };

            if Some(field.as_str()) == self.schema.id_field()
                && candidate.get(field) != Some(value)
            {
                let message = format!("{field} cannot be changed (is ID-field)");
                self.audit.log(
                    Some(session),
                    &format!("Error updating in {}", self.name()),
                    &message,
                    true,
                );
                return Err(RepoError::ValidationFailed(ValidationErrors::single(
                    field, message,
                )));
            }

            let prior = candidate.get(field).cloned();
            match self
                .policy
                .check_field(session, field, prior.as_deref(), value)
            {
                FieldOutcome::Keep => {
                    candidate.insert(field.clone(), value.clone());
                }
                FieldOutcome::Coerce { enforced } => {
                    self.log_coercion(session, field, value, &enforced);
                    candidate.insert(field.clone(), enforced);
                }
            }
        }

        self.validated(session, "update invalid data", &candidate)?;

        rows[index].decoded = Decoded::Ok(candidate);
        self.backend
            .rewrite(&rows)
            .map_err(|err| self.storage_failure(session, err))
    }

    /// Hard-deletes one record. Deleting an absent id is `NotFound`, not a
    /// denial or a failure.
    pub fn delete(&self, session: &Session, id: &str) -> RepoResult<()> {
        self.authorize(
            session,
            self.policy.can_delete(session, id),
            &format!("Unauthorized Delete call in {} (id: {id})", self.name()),
        )?;
        self.audit.log(
            Some(session),
            &format!("Delete in {}", self.name()),
            &format!("id: {id}"),
            false,
        );

        let mut rows = self.fetch_rows(session)?;
        let mut found = None;
        for (index, row) in rows.iter().enumerate() {
            if let Decoded::Ok(record) = &row.decoded {
                if self.matches_id(id, row.position, record) {
                    found = Some(index);
                    break;
                }
            }
        }
        let Some(index) = found else {
            self.log_not_found(session, "deleting", id);
            return Err(RepoError::NotFound);
        };
        rows.remove(index);

        self.backend
            .rewrite(&rows)
            .map_err(|err| self.storage_failure(session, err))
    }

    // -- helpers ------------------------------------------------------------

    fn authorize(
        &self,
        session: &Session,
        requirement: crate::access::Requirement,
        report: &str,
    ) -> RepoResult<()> {
        if session.satisfies(requirement) {
            return Ok(());
        }
        self.audit.log(
            Some(session),
            report,
            &format!("user: {}", session.username()),
            true,
        );
        Err(RepoError::AccessDenied)
    }

    /// Reads the full row set, auditing every corrupt row as suspicious.
    /// Corrupt rows stay in the result so mutations can carry them through
    /// a rewrite instead of discarding them.
    fn fetch_rows(&self, session: &Session) -> RepoResult<Vec<Row>> {
        let rows = self
            .backend
            .list()
            .map_err(|err| self.storage_failure(session, err))?;
        for row in &rows {
            if let Decoded::Corrupt { reason, .. } = &row.decoded {
                self.audit.log(
                    Some(session),
                    &format!("Corrupt record in {}", self.name()),
                    &format!("line {}: {reason}", row.position),
                    true,
                );
            }
        }
        Ok(rows)
    }

    /// Reads every decodable row; corrupt rows are skipped (after being
    /// audited), never fatal to the operation.
    fn decoded_rows(&self, session: &Session) -> RepoResult<Vec<(usize, Record)>> {
        Ok(self
            .fetch_rows(session)?
            .into_iter()
            .filter_map(|row| match row.decoded {
                Decoded::Ok(record) => Some((row.position, record)),
                Decoded::Corrupt { .. } => None,
            })
            .collect())
    }

    fn matches_id(&self, id: &str, position: usize, record: &Record) -> bool {
        match self.schema.id_field() {
            Some(field) => record.get(field).map(String::as_str) == Some(id),
            None => position.to_string() == id,
        }
    }

    fn record_id(&self, position: usize, record: &Record) -> String {
        match self.schema.id_field() {
            Some(field) => record
                .get(field)
                .cloned()
                .unwrap_or_else(|| position.to_string()),
            None => position.to_string(),
        }
    }

    fn validated(&self, session: &Session, action: &str, record: &Record) -> RepoResult<()> {
        match self.schema.validate(record) {
            Ok(()) => Ok(()),
            Err(errors) => {
                self.log_validation_errors(session, action, &errors);
                Err(RepoError::ValidationFailed(errors))
            }
        }
    }

    /// Invalid data reaching this layer is a tampering signal: every
    /// violated rule becomes its own suspicious audit entry.
    fn log_validation_errors(&self, session: &Session, action: &str, errors: &ValidationErrors) {
        for (field, messages) in errors.iter() {
            for message in messages {
                self.audit.log(
                    Some(session),
                    &format!("Attempt to {action} in {}", self.name()),
                    &format!("field '{field}': {message}"),
                    true,
                );
            }
        }
    }

    fn log_coercion(&self, session: &Session, field: &str, attempted: &str, enforced: &str) {
        self.audit.log(
            Some(session),
            &format!("Field change coerced in {}", self.name()),
            &format!("field '{field}': attempted '{attempted}', enforced '{enforced}'"),
            true,
        );
    }

    fn log_not_found(&self, session: &Session, verb: &str, id: &str) {
        let field = self.schema.id_field().unwrap_or("item number");
        self.audit.log(
            Some(session),
            &format!("Error {verb} in {}", self.name()),
            &format!("there is no {field} '{id}'"),
            false,
        );
    }

    fn storage_failure(&self, session: &Session, err: crate::storage::StorageError) -> RepoError {
        self.audit.log(
            Some(session),
            &format!("Storage failure in {}", self.name()),
            &err.to_string(),
            true,
        );
        RepoError::StorageFailure(err.to_string())
    }

    fn payload_summary(&self, record: &Record) -> String {
        match self.schema.id_field().and_then(|field| record.get(field)) {
            Some(id) => format!("id: {id}"),
            None => format!("{} fields", record.len()),
        }
    }
}

fn search_matches(record: &Record, position: usize, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.to_lowercase().contains(needle))
        || position.to_string() == needle
}
