//! # Session Context
//!
//! The active identity, passed explicitly into every repository call. There
//! is no process-wide "current user": tests and future concurrent sessions
//! get their own value.

use crate::validation::Record;

use super::roles::{Requirement, Tier};

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    tier: Tier,
    /// Set only for the hard-coded super identity, which is not a persisted
    /// role value.
    is_super_identity: bool,
    profile: Option<Record>,
}

impl Session {
    pub fn new(username: &str, tier: Tier) -> Self {
        Self {
            username: username.to_string(),
            tier,
            is_super_identity: false,
            profile: None,
        }
    }

    /// The singular hard-coded super administrator identity.
    pub fn super_identity(username: &str) -> Self {
        Self {
            username: username.to_string(),
            tier: Tier::SuperAdministrator,
            is_super_identity: true,
            profile: None,
        }
    }

    /// Attach the user's own profile record.
    pub fn with_profile(mut self, profile: Record) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn is_super_identity(&self) -> bool {
        self.is_super_identity
    }

    pub fn profile(&self) -> Option<&Record> {
        self.profile.as_ref()
    }

    /// Whether this session satisfies a role requirement.
    pub fn satisfies(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Everyone => true,
            Requirement::Role(tier) => self.tier.satisfies(tier),
            Requirement::Unreachable => false,
        }
    }

    /// Capability orthogonal to the tier ordering: every authenticated tier
    /// may change its own password except the hard-coded super identity.
    pub fn can_change_own_password(&self) -> bool {
        !self.is_super_identity
    }
}
