//! # Validation Rules
//!
//! A rule is a pure predicate over a string value paired with a
//! human-readable failure message. Rules are composable; a field is valid
//! only when every attached rule passes, and validation collects every
//! failing message instead of short-circuiting.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

/// Maximum accepted length for any field value, in characters.
///
/// Bounds record size for fixed-format storage and encryption chunking.
pub const MAX_FIELD_LEN: usize = 1000;

/// A named predicate with the message shown when it fails.
pub struct Rule {
    message: String,
    check: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Rule {
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            check: Box::new(check),
        }
    }

    /// The failure message for this rule.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Runs the predicate against a value.
    pub fn passes(&self, value: &str) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("message", &self.message).finish()
    }
}

// ---------------------------------------------------------------------------
// Baseline rules (applied to every field)
// ---------------------------------------------------------------------------

pub fn not_too_long(label: &str) -> Rule {
    Rule::new(
        format!("{label} should not be longer than {MAX_FIELD_LEN} characters"),
        |s| s.chars().count() <= MAX_FIELD_LEN,
    )
}

/// Control characters (ASCII 0-31) would corrupt newline-delimited storage.
pub fn no_control_characters(label: &str) -> Rule {
    Rule::new(
        format!("{label} should not contain ASCII control characters"),
        |s| !s.chars().any(|c| (c as u32) < 32),
    )
}

pub fn not_empty(label: &str) -> Rule {
    Rule::new(format!("{label} should not be empty"), |s| !s.is_empty())
}

/// For "press enter to continue" confirmations.
pub fn must_be_empty(label: &str) -> Rule {
    Rule::new(format!("{label} must be empty"), |s| s.is_empty())
}

// ---------------------------------------------------------------------------
// General rules
// ---------------------------------------------------------------------------

pub fn digits_only(label: &str) -> Rule {
    Rule::new(format!("{label} should only contain the digits 0-9"), |s| {
        s.chars().all(|c| c.is_ascii_digit())
    })
}

pub fn value_in_list(label: &str, values: &[&str]) -> Rule {
    let allowed: Vec<String> = values.iter().map(|v| v.to_uppercase()).collect();
    let shown: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    Rule::new(
        format!("{label} should be one of the following: {}", shown.join(", ")),
        move |s| allowed.iter().any(|v| v == &s.to_uppercase()),
    )
}

pub fn at_least(label: &str, length: usize) -> Rule {
    Rule::new(
        format!("{label} should have at least {length} characters"),
        move |s| s.chars().count() >= length,
    )
}

pub fn no_longer_than(label: &str, length: usize) -> Rule {
    Rule::new(
        format!("{label} should have no more than {length} characters"),
        move |s| s.chars().count() <= length,
    )
}

// ---------------------------------------------------------------------------
// Username and password rules
// ---------------------------------------------------------------------------

pub fn starts_with_letter_or_underscore(label: &str) -> Rule {
    Rule::new(
        format!("{label} should start with a letter or underscore"),
        |s| matches!(s.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_'),
    )
}

pub fn valid_username_characters(label: &str) -> Rule {
    Rule::new(
        format!("{label} should contain only letters, numbers, underscores, apostrophes or periods"),
        |s| s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '.')),
    )
}

pub fn contains_lowercase(label: &str) -> Rule {
    Rule::new(
        format!("{label} should contain at least one lowercase letter"),
        |s| s.chars().any(|c| c.is_ascii_lowercase()),
    )
}

pub fn contains_uppercase(label: &str) -> Rule {
    Rule::new(
        format!("{label} should contain at least one uppercase letter"),
        |s| s.chars().any(|c| c.is_ascii_uppercase()),
    )
}

pub fn contains_digit(label: &str) -> Rule {
    Rule::new(format!("{label} should contain at least one digit"), |s| {
        s.chars().any(|c| c.is_ascii_digit())
    })
}

pub fn contains_special(label: &str) -> Rule {
    Rule::new(
        format!("{label} should contain at least one special character"),
        |s| s.chars().any(|c| !c.is_ascii_alphanumeric()),
    )
}

// ---------------------------------------------------------------------------
// Member identifier rules
// ---------------------------------------------------------------------------

/// Checksum formula for the last digit of a member identifier.
///
/// The formula is a configurable policy: both variants have shipped and
/// neither is treated as the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Last digit equals the sum of the first nine digits, mod 10.
    DigitSum,
    /// Last digit equals a fold of `(check + ascii(digit) - 8) % 10` over
    /// the first nine digits.
    AsciiOffset,
}

impl ChecksumPolicy {
    fn verify(self, value: &str) -> bool {
        let bytes = value.as_bytes();
        if bytes.len() != 10 || !bytes.iter().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let expected = (bytes[9] - b'0') as u32;
        let check = match self {
            ChecksumPolicy::DigitSum => bytes[..9]
                .iter()
                .fold(0u32, |sum, b| (sum + (b - b'0') as u32) % 10),
            ChecksumPolicy::AsciiOffset => bytes[..9]
                .iter()
                .fold(0u32, |sum, b| (sum + *b as u32 - 8) % 10),
        };
        check == expected
    }
}

pub fn ten_digits(label: &str) -> Rule {
    Rule::new(format!("{label} should be ten digits"), |s| {
        s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit())
    })
}

/// The identifier starts with the two-digit registration year, which can
/// never be in the future.
pub fn two_digit_year(label: &str) -> Rule {
    Rule::new(
        format!("{label} should start with a two-digit year that is not in the future"),
        |s| {
            let Some(prefix) = s.get(..2) else {
                return false;
            };
            match prefix.parse::<i32>() {
                Ok(year) => year <= Local::now().year() % 100,
                Err(_) => false,
            }
        },
    )
}

pub fn checksum(label: &str, policy: ChecksumPolicy) -> Rule {
    Rule::new(format!("{label} should have a valid checksum"), move |s| {
        policy.verify(s)
    })
}

// ---------------------------------------------------------------------------
// Profile field rules
// ---------------------------------------------------------------------------

pub fn valid_date(label: &str) -> Rule {
    Rule::new(
        format!("{label} should be a valid date (YYYY-MM-DD)"),
        |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
    )
}

pub fn adult_age(label: &str) -> Rule {
    Rule::new(format!("{label} should be over 18"), |s| {
        s.parse::<u32>().map(|n| n >= 18).unwrap_or(false)
    })
}

pub fn realistic_age(label: &str) -> Rule {
    // Oldest person ever was 122.
    Rule::new(format!("{label} should be a realistic number"), |s| {
        s.parse::<u32>().map(|n| n <= 122).unwrap_or(false)
    })
}

pub fn realistic_weight(label: &str) -> Rule {
    Rule::new(format!("{label} should be a realistic number"), |s| {
        s.parse::<u32>().map(|n| (30..=600).contains(&n)).unwrap_or(false)
    })
}

fn home_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[\s\-]?[a-zA-Z\d]*$").expect("pattern is valid"))
}

pub fn home_number(label: &str) -> Rule {
    Rule::new(
        format!("{label} should be a valid home number (number + possible suffix)"),
        |s| home_number_re().is_match(s),
    )
}

pub fn postcode(label: &str) -> Rule {
    Rule::new(
        format!("{label} should be a valid postcode (such as 1234AB)"),
        |s| {
            s.len() == 6
                && s.bytes().take(4).all(|b| b.is_ascii_digit())
                && s.bytes().skip(4).all(|b| b.is_ascii_alphabetic())
        },
    )
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([a-zA-Z\d][a-zA-Z\d+\-.]*[a-zA-Z\d]|[a-zA-Z\d])@([a-zA-Z\d][a-zA-Z\d\-.]*[a-zA-Z\d]|[a-zA-Z\d])\.[a-zA-Z\d]+$",
        )
        .expect("pattern is valid")
    })
}

pub fn email(label: &str) -> Rule {
    Rule::new(format!("{label} should be a valid e-mail address"), |s| {
        email_re().is_match(s)
    })
}

/// Eight digits: the subscriber part of a +31 6 mobile number.
pub fn phone(label: &str) -> Rule {
    Rule::new(
        format!("{label} should be a valid eight-digit mobile phone number (excluding 06 or +31 6)"),
        |s| s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_rules() {
        assert!(not_too_long("Name").passes(&"a".repeat(MAX_FIELD_LEN)));
        assert!(!not_too_long("Name").passes(&"a".repeat(MAX_FIELD_LEN + 1)));

        assert!(no_control_characters("Name").passes("plain text"));
        assert!(!no_control_characters("Name").passes("line\nbreak"));
        assert!(!no_control_characters("Name").passes("nul\0byte"));

        assert!(not_empty("Name").passes("x"));
        assert!(!not_empty("Name").passes(""));

        assert!(must_be_empty("Continue").passes(""));
        assert!(!must_be_empty("Continue").passes("stray input"));
    }

    #[test]
    fn test_digits_only_accepts_empty() {
        assert!(digits_only("Age").passes(""));
        assert!(digits_only("Age").passes("042"));
        assert!(!digits_only("Age").passes("4x"));
    }

    #[test]
    fn test_value_in_list_is_case_insensitive() {
        let rule = value_in_list("Gender", &["M", "F", "X"]);
        assert!(rule.passes("m"));
        assert!(rule.passes("X"));
        assert!(!rule.passes("Q"));
        assert!(rule.message().contains("M, F, X"));
    }

    #[test]
    fn test_username_rules() {
        assert!(starts_with_letter_or_underscore("Username").passes("_abc"));
        assert!(!starts_with_letter_or_underscore("Username").passes("9abc"));
        assert!(valid_username_characters("Username").passes("a.b'c_9"));
        assert!(!valid_username_characters("Username").passes("a b"));
    }

    #[test]
    fn test_password_content_rules() {
        assert!(contains_lowercase("Password").passes("aB1!"));
        assert!(!contains_uppercase("Password").passes("ab1!"));
        assert!(contains_digit("Password").passes("ab1"));
        assert!(contains_special("Password").passes("ab1!"));
        assert!(!contains_special("Password").passes("ab12"));
    }

    #[test]
    fn test_ten_digits() {
        assert!(ten_digits("ID").passes("2400000006"));
        assert!(!ten_digits("ID").passes("240000006"));
        assert!(!ten_digits("ID").passes("24000000ab"));
    }

    #[test]
    fn test_two_digit_year_rejects_future() {
        assert!(two_digit_year("ID").passes("0012345678"));
        assert!(!two_digit_year("ID").passes("9912345678"));
        assert!(!two_digit_year("ID").passes("x"));
    }

    #[test]
    fn test_checksum_policies_agree_on_digit_strings() {
        // (check + ascii - 8) % 10 reduces to (check + digit) % 10, so the
        // two shipped formulas coincide; both stay available as policies.
        for id in ["2400000006", "1012345677", "0000000000"] {
            assert_eq!(
                checksum("ID", ChecksumPolicy::DigitSum).passes(id),
                checksum("ID", ChecksumPolicy::AsciiOffset).passes(id),
            );
        }
        assert!(checksum("ID", ChecksumPolicy::DigitSum).passes("2400000006"));
        assert!(!checksum("ID", ChecksumPolicy::DigitSum).passes("2400000005"));
    }

    #[test]
    fn test_profile_rules() {
        assert!(valid_date("Date").passes("2024-02-29"));
        assert!(!valid_date("Date").passes("2023-02-29"));
        assert!(!valid_date("Date").passes("01-01-2023"));

        assert!(adult_age("Age").passes("18"));
        assert!(!adult_age("Age").passes("17"));
        assert!(realistic_age("Age").passes("122"));
        assert!(!realistic_age("Age").passes("123"));
        assert!(realistic_weight("Weight").passes("80"));
        assert!(!realistic_weight("Weight").passes("10"));

        assert!(home_number("Number").passes("12"));
        assert!(home_number("Number").passes("12-a"));
        assert!(!home_number("Number").passes("a12"));

        assert!(postcode("ZIP").passes("1234AB"));
        assert!(!postcode("ZIP").passes("12345"));

        assert!(email("E-mail").passes("a.name@example.com"));
        assert!(!email("E-mail").passes("not-an-email"));

        assert!(phone("Phone").passes("12345678"));
        assert!(!phone("Phone").passes("0612345678"));
    }
}
