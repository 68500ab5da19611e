//! # Role Tiers
//!
//! The role hierarchy is data, not code structure: an ordered enumeration
//! of tiers compared by rank. Each tier can do everything the tiers below
//! it can.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rank in the role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Consultant,
    Administrator,
    SuperAdministrator,
}

impl Tier {
    pub fn rank(self) -> u8 {
        match self {
            Tier::Consultant => 1,
            Tier::Administrator => 2,
            Tier::SuperAdministrator => 3,
        }
    }

    /// Whether a holder of this tier satisfies the required tier.
    pub fn satisfies(self, required: Tier) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Consultant => "Consultant",
            Tier::Administrator => "Administrator",
            Tier::SuperAdministrator => "SuperAdministrator",
        }
    }

    /// Parses a stored role value, case-insensitively.
    pub fn parse(value: &str) -> Option<Tier> {
        match value.to_lowercase().as_str() {
            "consultant" => Some(Tier::Consultant),
            "administrator" => Some(Tier::Administrator),
            "superadministrator" => Some(Tier::SuperAdministrator),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role requirement a policy computes for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated caller.
    Everyone,
    /// Callers holding at least this tier.
    Role(Tier),
    /// Nobody, ever (for example self-deletion).
    Unreachable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_is_strictly_ordered() {
        assert!(Tier::Consultant < Tier::Administrator);
        assert!(Tier::Administrator < Tier::SuperAdministrator);
    }

    #[test]
    fn test_satisfies_compares_ranks() {
        assert!(Tier::Administrator.satisfies(Tier::Consultant));
        assert!(Tier::Administrator.satisfies(Tier::Administrator));
        assert!(!Tier::Administrator.satisfies(Tier::SuperAdministrator));
        assert!(Tier::SuperAdministrator.satisfies(Tier::Consultant));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Tier::parse("administrator"), Some(Tier::Administrator));
        assert_eq!(Tier::parse("CONSULTANT"), Some(Tier::Consultant));
        assert_eq!(Tier::parse("root"), None);
    }
}
