//! # Entity Definitions
//!
//! Schemas and access policies for the four entity types, and constructors
//! wiring them to a storage backend and the audit log.

use std::sync::Arc;

use crate::access::{Requirement, Session, Tier};
use crate::audit::AuditLog;
use crate::storage::StorageBackend;
use crate::validation::{rules, ChecksumPolicy, FieldDef, Schema};

use super::core::Repository;
use super::policy::{AccessPolicy, FieldOutcome};

/// Role value stored for a freshly inserted user when the caller may not
/// assign roles.
pub const DEFAULT_ROLE: &str = "Consultant";

const CITIES: [&str; 10] = [
    "Amsterdam",
    "Rotterdam",
    "Den Haag",
    "Utrecht",
    "Eindhoven",
    "Groningen",
    "Leiden",
    "Delft",
    "Dordrecht",
    "Gouda",
];

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Member record schema. The checksum formula for the identifier is a
/// configurable policy.
pub fn member_schema(checksum: ChecksumPolicy) -> Schema {
    Schema::new("Members")
        .with_id_field("id")
        .field(
            FieldDef::read_only("id", "ID")
                .with_rule(rules::ten_digits("ID"))
                .with_rule(rules::two_digit_year("ID"))
                .with_rule(rules::checksum("ID", checksum))
                .with_width(12),
        )
        .field(FieldDef::text("firstName", "First name"))
        .field(FieldDef::text("lastName", "Last name"))
        .field(
            FieldDef::numeric("age", "Age")
                .with_rule(rules::adult_age("Age"))
                .with_rule(rules::realistic_age("Age"))
                .with_width(4),
        )
        .field(
            FieldDef::enumerated("gender", "Gender", &["M", "F", "X"])
                .with_display("M", "Male")
                .with_display("F", "Female")
                .with_display("X", "Other")
                .with_width(8),
        )
        .field(
            FieldDef::numeric("weight", "Weight")
                .with_rule(rules::realistic_weight("Weight"))
                .with_width(6),
        )
        .field(FieldDef::text("street", "Street"))
        .field(FieldDef::text("no", "Number").with_rule(rules::home_number("Number")))
        .field(FieldDef::text("zip", "ZIP (Postcode)").with_rule(rules::postcode("ZIP (Postcode)")))
        .field(FieldDef::enumerated("city", "City", &CITIES))
        .field(FieldDef::text("email", "E-mail address").with_rule(rules::email("E-mail address")))
        .field(
            FieldDef::text("phone", "Mobile phone (+31 6)")
                .with_rule(rules::phone("Mobile phone (+31 6)")),
        )
        .field(
            FieldDef::read_only("registrationDate", "Registration date")
                .with_rule(rules::valid_date("Registration date")),
        )
}

/// User record schema. The password field holds a salted digest and is
/// hidden; the role field is assigned by policy, never typed in.
pub fn user_schema() -> Schema {
    Schema::new("Users")
        .with_id_field("username")
        .field(
            FieldDef::text("username", "Username")
                .with_rule(rules::at_least("Username", 8))
                .with_rule(rules::no_longer_than("Username", 10))
                .with_rule(rules::starts_with_letter_or_underscore("Username"))
                .with_rule(rules::valid_username_characters("Username"))
                .with_width(12),
        )
        .field(FieldDef::hidden("password", "Password"))
        .field(FieldDef::read_only("role", "Role").with_rule(rules::value_in_list(
            "Role",
            &["Consultant", "Administrator"],
        )))
        .field(
            FieldDef::read_only("registrationDate", "Registration date")
                .with_rule(rules::valid_date("Registration date")),
        )
}

/// Form schema for the change-own-password flow. Nothing stores this record
/// as-is: the new password is hashed before it reaches a user record.
pub fn change_password_schema() -> Schema {
    Schema::new("ChangePassword")
        .field(FieldDef::text("currentPassword", "Current password"))
        .field(
            FieldDef::text("newPassword", "New password")
                .with_rule(rules::at_least("New password", 12))
                .with_rule(rules::no_longer_than("New password", 30))
                .with_rule(rules::contains_lowercase("New password"))
                .with_rule(rules::contains_uppercase("New password"))
                .with_rule(rules::contains_digit("New password"))
                .with_rule(rules::contains_special("New password")),
        )
}

fn log_fields(schema: Schema) -> Schema {
    schema
        .field(FieldDef::read_only("date", "Date").with_rule(rules::valid_date("Date")))
        .field(FieldDef::read_only("time", "Time").with_width(10))
        .field(FieldDef::optional_text("username", "Username").with_width(12))
        .field(FieldDef::text("activity", "Message").with_width(40))
        .field(FieldDef::text("details", "Details").with_width(40))
        .field(FieldDef::enumerated("suspicious", "Suspicious", &["Y", "N"]).with_width(10))
}

/// Schema of the primary (all-events) log store. No identifier field:
/// entries are addressed by line number.
pub fn log_schema() -> Schema {
    log_fields(Schema::new("Logs"))
}

/// Schema of the unreviewed-suspicious-events store.
pub fn suspicious_log_schema() -> Schema {
    log_fields(Schema::new("SuspiciousLogs"))
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Members: consultants handle day-to-day member data; deletion is an
/// administrator action.
struct MemberPolicy;

impl AccessPolicy for MemberPolicy {
    fn can_read(&self, _session: &Session, _id: Option<&str>) -> Requirement {
        Requirement::Role(Tier::Consultant)
    }
    fn can_insert(&self, _session: &Session) -> Requirement {
        Requirement::Role(Tier::Consultant)
    }
    fn can_update(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Role(Tier::Consultant)
    }
    fn can_delete(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Role(Tier::Administrator)
    }
}

/// Users: administrators manage accounts, but every identity may read and
/// update its own record, no identity may delete itself, and only the top
/// tier assigns roles.
struct UserPolicy;

impl AccessPolicy for UserPolicy {
    fn can_read(&self, session: &Session, id: Option<&str>) -> Requirement {
        match id {
            Some(id) if id == session.username() => Requirement::Everyone,
            _ => Requirement::Role(Tier::Administrator),
        }
    }

    fn can_insert(&self, _session: &Session) -> Requirement {
        Requirement::Role(Tier::Administrator)
    }

    fn can_update(&self, session: &Session, id: &str) -> Requirement {
        if id == session.username() {
            Requirement::Everyone
        } else {
            Requirement::Role(Tier::Administrator)
        }
    }

    fn can_delete(&self, session: &Session, id: &str) -> Requirement {
        // Self-deletion is always denied, independent of role.
        if id == session.username() {
            Requirement::Unreachable
        } else {
            Requirement::Role(Tier::Administrator)
        }
    }

    fn check_field(
        &self,
        session: &Session,
        field: &str,
        prior: Option<&str>,
        proposed: &str,
    ) -> FieldOutcome {
        if field != "role" || session.tier().satisfies(Tier::SuperAdministrator) {
            return FieldOutcome::Keep;
        }
        let enforced = prior.unwrap_or(DEFAULT_ROLE);
        if proposed == enforced {
            FieldOutcome::Keep
        } else {
            FieldOutcome::Coerce {
                enforced: enforced.to_string(),
            }
        }
    }
}

/// The primary log is readable by administrators and writable by nobody:
/// the audit sink appends directly, below the repository layer.
struct LogPolicy;

impl AccessPolicy for LogPolicy {
    fn can_read(&self, _session: &Session, _id: Option<&str>) -> Requirement {
        Requirement::Role(Tier::Administrator)
    }
    fn can_insert(&self, _session: &Session) -> Requirement {
        Requirement::Unreachable
    }
    fn can_update(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Unreachable
    }
    fn can_delete(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Unreachable
    }
}

/// The suspicious store is an index of unreviewed events: deleting from it
/// means "mark as reviewed" and never touches the primary log.
struct SuspiciousLogPolicy;

impl AccessPolicy for SuspiciousLogPolicy {
    fn can_read(&self, _session: &Session, _id: Option<&str>) -> Requirement {
        Requirement::Role(Tier::Administrator)
    }
    fn can_insert(&self, _session: &Session) -> Requirement {
        Requirement::Unreachable
    }
    fn can_update(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Unreachable
    }
    fn can_delete(&self, _session: &Session, _id: &str) -> Requirement {
        Requirement::Role(Tier::Administrator)
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

pub fn members<B: StorageBackend>(
    backend: B,
    audit: Arc<AuditLog>,
    checksum: ChecksumPolicy,
) -> Repository<B> {
    Repository::new(member_schema(checksum), Box::new(MemberPolicy), backend, audit)
}

pub fn users<B: StorageBackend>(backend: B, audit: Arc<AuditLog>) -> Repository<B> {
    Repository::new(user_schema(), Box::new(UserPolicy), backend, audit)
}

pub fn logs<B: StorageBackend>(backend: B, audit: Arc<AuditLog>) -> Repository<B> {
    Repository::new(log_schema(), Box::new(LogPolicy), backend, audit)
}

pub fn suspicious_logs<B: StorageBackend>(backend: B, audit: Arc<AuditLog>) -> Repository<B> {
    Repository::new(suspicious_log_schema(), Box::new(SuspiciousLogPolicy), backend, audit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Record;

    fn consultant() -> Session {
        Session::new("consult_1", Tier::Consultant)
    }

    fn admin() -> Session {
        Session::new("admin_one", Tier::Administrator)
    }

    #[test]
    fn test_member_policy_tiers() {
        let policy = MemberPolicy;
        let session = consultant();
        assert_eq!(policy.can_read(&session, None), Requirement::Role(Tier::Consultant));
        assert_eq!(policy.can_insert(&session), Requirement::Role(Tier::Consultant));
        assert_eq!(
            policy.can_delete(&session, "2400000006"),
            Requirement::Role(Tier::Administrator)
        );
    }

    #[test]
    fn test_user_policy_own_record_carve_out() {
        let policy = UserPolicy;
        let session = consultant();
        assert_eq!(policy.can_read(&session, Some("consult_1")), Requirement::Everyone);
        assert_eq!(
            policy.can_read(&session, Some("other_user")),
            Requirement::Role(Tier::Administrator)
        );
        assert_eq!(policy.can_update(&session, "consult_1"), Requirement::Everyone);
    }

    #[test]
    fn test_user_policy_self_deletion_unreachable() {
        let policy = UserPolicy;
        let session = admin();
        assert_eq!(policy.can_delete(&session, "admin_one"), Requirement::Unreachable);
        assert_eq!(
            policy.can_delete(&session, "other_user"),
            Requirement::Role(Tier::Administrator)
        );
    }

    #[test]
    fn test_role_field_coerced_for_non_super() {
        let policy = UserPolicy;

        // Update: coerced back to the prior value, even for administrators.
        let outcome = policy.check_field(&admin(), "role", Some("Consultant"), "Administrator");
        assert_eq!(
            outcome,
            FieldOutcome::Coerce {
                enforced: "Consultant".to_string()
            }
        );

        // Insert: coerced to the fixed default.
        let outcome = policy.check_field(&admin(), "role", None, "Administrator");
        assert_eq!(
            outcome,
            FieldOutcome::Coerce {
                enforced: DEFAULT_ROLE.to_string()
            }
        );

        // Unchanged value passes without a coercion event.
        let outcome = policy.check_field(&admin(), "role", Some("Consultant"), "Consultant");
        assert_eq!(outcome, FieldOutcome::Keep);

        // The super identity assigns roles freely.
        let root = Session::super_identity("super_admin");
        let outcome = policy.check_field(&root, "role", Some("Consultant"), "Administrator");
        assert_eq!(outcome, FieldOutcome::Keep);
    }

    #[test]
    fn test_log_policies_forbid_writes() {
        let session = Session::super_identity("super_admin");
        assert_eq!(LogPolicy.can_insert(&session), Requirement::Unreachable);
        assert_eq!(LogPolicy.can_delete(&session, "1"), Requirement::Unreachable);
        assert_eq!(SuspiciousLogPolicy.can_insert(&session), Requirement::Unreachable);
        assert_eq!(
            SuspiciousLogPolicy.can_delete(&session, "1"),
            Requirement::Role(Tier::Administrator)
        );
    }

    #[test]
    fn test_member_schema_accepts_valid_record() {
        let schema = member_schema(ChecksumPolicy::DigitSum);
        let record = Record::from([
            ("id".to_string(), "2400000006".to_string()),
            ("firstName".to_string(), "Alice".to_string()),
            ("lastName".to_string(), "de Vries".to_string()),
            ("age".to_string(), "30".to_string()),
            ("gender".to_string(), "F".to_string()),
            ("weight".to_string(), "60".to_string()),
            ("street".to_string(), "Coolsingel".to_string()),
            ("no".to_string(), "12a".to_string()),
            ("zip".to_string(), "3011AB".to_string()),
            ("city".to_string(), "Rotterdam".to_string()),
            ("email".to_string(), "alice@example.com".to_string()),
            ("phone".to_string(), "12345678".to_string()),
            ("registrationDate".to_string(), "2024-05-01".to_string()),
        ]);
        assert!(schema.validate(&record).is_ok());
    }

    #[test]
    fn test_temporary_password_forces_a_change() {
        // Temporary passwords are alphanumeric only, so the special-character
        // rule fails and the next login demands a new password.
        let schema = change_password_schema();
        let field = schema.field_named("newPassword").unwrap();
        assert!(!field.validate(&crate::crypto::temp_password()).is_empty());
        assert!(field.validate("Str0ng&Secret!").is_empty());
    }

    #[test]
    fn test_user_schema_rejects_bad_username() {
        let schema = user_schema();
        let record = Record::from([
            ("username".to_string(), "x".to_string()),
            ("password".to_string(), String::new()),
            ("role".to_string(), "Consultant".to_string()),
            ("registrationDate".to_string(), "2024-05-01".to_string()),
        ]);
        let errors = schema.validate(&record).unwrap_err();
        assert!(!errors.messages("username").is_empty());
    }
}
