//! # Field Definitions
//!
//! A field definition couples a model key with a human label, the rules its
//! value must satisfy and its interaction behavior (editable, hidden,
//! displayed width). Field kinds layer behavior over the same baseline
//! rules: every value must fit the length budget, contain no control
//! characters and (unless explicitly allowed) not be empty.

use super::rules::{self, Rule};

const DEFAULT_DISPLAY_WIDTH: usize = 20;

/// How a field behaves during input and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Digits only; parses to an integer, empty stays empty.
    Numeric,
    /// Restricted to an allow-list, matched case-insensitively.
    Enumerated,
    /// Never solicits input; the existing value is echoed through.
    ReadOnly,
    /// Read-only and suppressed from any display.
    Hidden,
    /// Pure display-advance step; the value must be empty.
    Confirmation,
}

/// A single field of a schema.
#[derive(Debug)]
pub struct FieldDef {
    name: String,
    label: String,
    kind: FieldKind,
    rules: Vec<Rule>,
    allow_empty: bool,
    width: usize,
    /// Raw stored value to display string, for enumerated fields.
    display_map: Vec<(String, String)>,
}

impl FieldDef {
    fn base(name: &str, label: &str, kind: FieldKind, allow_empty: bool) -> Self {
        let mut field_rules = vec![
            rules::not_too_long(label),
            rules::no_control_characters(label),
        ];
        if !allow_empty {
            field_rules.push(rules::not_empty(label));
        }
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            rules: field_rules,
            allow_empty,
            width: DEFAULT_DISPLAY_WIDTH,
            display_map: Vec::new(),
        }
    }

    /// Required text field.
    pub fn text(name: &str, label: &str) -> Self {
        Self::base(name, label, FieldKind::Text, false)
    }

    /// Text field that may be left empty.
    pub fn optional_text(name: &str, label: &str) -> Self {
        Self::base(name, label, FieldKind::Text, true)
    }

    /// Required positive integer field.
    pub fn numeric(name: &str, label: &str) -> Self {
        let mut field = Self::base(name, label, FieldKind::Numeric, false);
        field.rules.push(rules::digits_only(label));
        field
    }

    /// Numeric field that may be left empty. An empty value round-trips as
    /// the empty string, never as zero.
    pub fn optional_numeric(name: &str, label: &str) -> Self {
        let mut field = Self::base(name, label, FieldKind::Numeric, true);
        field.rules.push(rules::digits_only(label));
        field
    }

    /// Field restricted to an allow-list. Empty is permitted only when the
    /// list itself contains the empty string.
    pub fn enumerated(name: &str, label: &str, values: &[&str]) -> Self {
        let allow_empty = values.iter().any(|v| v.is_empty());
        let mut field = Self::base(name, label, FieldKind::Enumerated, allow_empty);
        field.rules.push(rules::value_in_list(label, values));
        field
    }

    /// Read-only field: validated but never solicited from the user.
    pub fn read_only(name: &str, label: &str) -> Self {
        Self::base(name, label, FieldKind::ReadOnly, true)
    }

    /// Hidden field: read-only and excluded from display.
    pub fn hidden(name: &str, label: &str) -> Self {
        Self::base(name, label, FieldKind::Hidden, true)
    }

    /// "Press enter to continue" field: the only valid value is empty.
    pub fn confirmation(name: &str, label: &str) -> Self {
        let mut field = Self::base(name, label, FieldKind::Confirmation, true);
        field.rules.push(rules::must_be_empty(label));
        field
    }

    /// Attach an extra rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the display width used for tabular rendering.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Map a raw stored value to a nicer display string. The stored value is
    /// never altered.
    pub fn with_display(mut self, raw: &str, shown: &str) -> Self {
        self.display_map.push((raw.to_string(), shown.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// Whether user-supplied mutation may touch this field.
    pub fn editable(&self) -> bool {
        !matches!(self.kind, FieldKind::ReadOnly | FieldKind::Hidden)
    }

    /// Whether the field is suppressed from tabular/detail display.
    pub fn is_hidden(&self) -> bool {
        self.kind == FieldKind::Hidden
    }

    /// Runs every rule and collects all failing messages (no short-circuit).
    pub fn validate(&self, value: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| !rule.passes(value))
            .map(|rule| rule.message().to_string())
            .collect()
    }

    /// Parses a numeric field value. Empty stays `None` to distinguish
    /// "intentionally blank" from zero.
    pub fn numeric_value(value: &str) -> Option<i64> {
        if value.is_empty() {
            return None;
        }
        value.parse().ok()
    }

    /// Renders `label: value` padded to the display width, or `None` for
    /// hidden fields. Enumerated raw values are mapped to display strings.
    pub fn display(&self, value: &str) -> Option<String> {
        if self.is_hidden() {
            return None;
        }
        // Pad and cut by characters, never by bytes: a byte index could
        // land inside a multibyte character.
        let label = if self.label.chars().count() > self.width {
            let mut cut: String = self
                .label
                .chars()
                .take(self.width.saturating_sub(3))
                .collect();
            cut.push_str("...");
            cut
        } else {
            format!("{:width$}", self.label, width = self.width)
        };
        let shown = self
            .display_map
            .iter()
            .find(|(raw, _)| raw.eq_ignore_ascii_case(value))
            .map(|(_, s)| s.as_str())
            .unwrap_or(value);
        Some(format!(" {label}: {shown}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules;

    #[test]
    fn test_text_field_baseline_rules() {
        let field = FieldDef::text("firstName", "First name");
        assert!(field.validate("Alice").is_empty());

        let errors = field.validate("");
        assert_eq!(errors, vec!["First name should not be empty"]);

        let errors = field.validate("bad\nvalue");
        assert_eq!(
            errors,
            vec!["First name should not contain ASCII control characters"]
        );
    }

    #[test]
    fn test_all_failing_rules_are_collected() {
        let field = FieldDef::text("password", "Password")
            .with_rule(rules::at_least("Password", 12))
            .with_rule(rules::contains_uppercase("Password"))
            .with_rule(rules::contains_special("Password"));

        let errors = field.validate("short");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_optional_text_allows_empty() {
        let field = FieldDef::optional_text("username", "Username");
        assert!(field.validate("").is_empty());
    }

    #[test]
    fn test_numeric_field() {
        let field = FieldDef::numeric("age", "Age");
        assert!(field.validate("42").is_empty());
        assert!(!field.validate("4x2").is_empty());
        assert!(!field.validate("").is_empty());

        assert_eq!(FieldDef::numeric_value("42"), Some(42));
        assert_eq!(FieldDef::numeric_value(""), None);
    }

    #[test]
    fn test_enumerated_field() {
        let field = FieldDef::enumerated("gender", "Gender", &["M", "F", "X"]);
        assert!(field.validate("m").is_empty());
        assert!(!field.validate("Q").is_empty());
        assert!(!field.allows_empty());

        let with_empty = FieldDef::enumerated("city", "City", &["", "Delft"]);
        assert!(with_empty.allows_empty());
        assert!(with_empty.validate("").is_empty());
    }

    #[test]
    fn test_read_only_and_hidden() {
        let read_only = FieldDef::read_only("id", "ID");
        assert!(!read_only.editable());
        assert!(!read_only.is_hidden());
        assert!(read_only.display("123").is_some());

        let hidden = FieldDef::hidden("password", "Password");
        assert!(!hidden.editable());
        assert!(hidden.is_hidden());
        assert_eq!(hidden.display("secret"), None);
    }

    #[test]
    fn test_confirmation_field() {
        let field = FieldDef::confirmation("continue", "Press Enter to continue");
        assert!(field.validate("").is_empty());
        assert!(!field.validate("stray text").is_empty());
    }

    #[test]
    fn test_display_handles_multibyte_labels() {
        // A label whose byte length exceeds the width while its char count
        // does not must render padded, not cut mid-character.
        let field = FieldDef::text("name", "Némo").with_width(5);
        assert_eq!(field.display("x").unwrap(), " Némo : x");

        // A genuinely over-wide label is shortened on char boundaries.
        let field = FieldDef::text("name", "Prénom complet").with_width(5);
        assert_eq!(field.display("x").unwrap(), " Pr...: x");
    }

    #[test]
    fn test_display_mapping_keeps_stored_value() {
        let field = FieldDef::enumerated("gender", "Gender", &["M", "F", "X"])
            .with_display("M", "Male")
            .with_display("F", "Female");
        let line = field.display("M").unwrap();
        assert!(line.contains("Male"));
        assert!(field.validate("M").is_empty());
    }
}
