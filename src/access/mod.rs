//! # Access Control
//!
//! Role tiers, requirements and the explicit session context.
//!
//! ## Invariants
//! - ACC-1: Tier satisfaction is a strict rank comparison, never special-cased
//! - ACC-2: `Requirement::Unreachable` is denied for every tier
//! - ACC-3: The session is a value passed per call, never process-global

pub mod attempts;
pub mod roles;
pub mod session;

pub use attempts::{LoginAttempts, MAX_LOGIN_ATTEMPTS};
pub use roles::{Requirement, Tier};
pub use session::Session;
