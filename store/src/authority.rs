//! Authorization checks.

use orng_types::{Name, PermissionLevel};
use std::fmt;

/// The authority an action demands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Any permission of the account.
    Actor(Name),
    /// A specific permission level, or whatever the ledger says satisfies it.
    Permission(PermissionLevel),
}

impl Requirement {
    /// The account whose authority is demanded.
    pub fn actor(&self) -> &Name {
        match self {
            Requirement::Actor(name) => name,
            Requirement::Permission(level) => &level.actor,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Actor(name) => write!(f, "{name}"),
            Requirement::Permission(level) => write!(f, "{}/{}", level.actor, level.permission),
        }
    }
}

/// Trait for deciding whether presented authorizations meet a requirement.
pub trait AuthorityChecker {
    /// Whether `provided` satisfies `required`.
    fn satisfies(&self, provided: &[PermissionLevel], required: &Requirement) -> bool;
}
