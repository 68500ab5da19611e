//! # Record Schema
//!
//! A schema is an ordered list of field definitions, optionally naming the
//! identifier field whose value uniquely names a record. Validation is
//! authoritative: a record failing it must never be persisted or returned
//! from a read.

use std::collections::BTreeMap;
use std::fmt;

use super::fields::FieldDef;

/// A record: a mapping of field name to string value, shaped by a [`Schema`].
pub type Record = BTreeMap<String, String>;

/// Field name to ordered list of violated-rule messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// A single-field, single-message error set.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Declarative record schema.
#[derive(Debug)]
pub struct Schema {
    name: String,
    id_field: Option<String>,
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id_field: None,
            fields: Vec::new(),
        }
    }

    /// Name the field whose value uniquely identifies a record.
    pub fn with_id_field(mut self, name: &str) -> Self {
        self.id_field = Some(name.to_string());
        self
    }

    /// Append a field (order is the display and prompt order).
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Validates a candidate record.
    ///
    /// Key mismatches (missing or unknown fields) reject immediately; when
    /// the key sets match, every rule of every field runs and all failing
    /// messages are collected.
    pub fn validate(&self, record: &Record) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in &self.fields {
            if !record.contains_key(field.name()) {
                errors.add(field.name(), "Field is missing");
            }
        }
        for key in record.keys() {
            if self.field_named(key).is_none() {
                errors.add(key, "Unknown field");
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        for field in &self.fields {
            if let Some(value) = record.get(field.name()) {
                for message in field.validate(value) {
                    errors.add(field.name(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Renders a record for detail display, skipping hidden fields and
    /// following the schema's field order.
    pub fn display(&self, record: &Record) -> String {
        let mut out = String::new();
        for field in &self.fields {
            let value = record.get(field.name()).map(String::as_str).unwrap_or("(no data)");
            if let Some(line) = field.display(value) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}
