//! The identity gate — single-identity sender validation.
//!
//! Comparison is exact-match, never pattern-match, and the gate is
//! evaluated unconditionally on every inbound message with no caching.

use serde::{Deserialize, Serialize};

/// Result of checking a sender against the authorized identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// Sender is the authorized identity.
    Allowed,
    /// Sender is not authorized. Carries the offending identifier so the
    /// intrusion can be reported to the owner.
    Denied { sender_id: String },
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

/// Validates senders against the one configured identity.
///
/// The identity is fixed at construction; there is no mutation path. A
/// multi-tenant deployment would swap this for a lookup table without
/// touching callers.
#[derive(Debug, Clone)]
pub struct IdentityGate {
    authorized: String,
}

impl IdentityGate {
    pub fn new(authorized: impl Into<String>) -> Self {
        Self {
            authorized: authorized.into(),
        }
    }

    /// Check a sender id. An empty configured identity denies everyone.
    pub fn check(&self, sender_id: &str) -> Access {
        if !self.authorized.is_empty() && sender_id == self.authorized {
            Access::Allowed
        } else {
            Access::Denied {
                sender_id: sender_id.into(),
            }
        }
    }

    /// The configured identity (for alert routing).
    pub fn authorized_id(&self) -> &str {
        &self.authorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorized_sender_allowed() {
        let gate = IdentityGate::new("123456789");
        assert_eq!(gate.check("123456789"), Access::Allowed);
    }

    #[test]
    fn unknown_sender_denied_with_id() {
        let gate = IdentityGate::new("123456789");
        match gate.check("999") {
            Access::Denied { sender_id } => assert_eq!(sender_id, "999"),
            Access::Allowed => panic!("Expected denied"),
        }
    }

    #[test]
    fn comparison_is_exact_not_prefix() {
        let gate = IdentityGate::new("1234");
        assert!(!gate.check("12345").is_allowed());
        assert!(!gate.check("123").is_allowed());
        assert!(!gate.check(" 1234").is_allowed());
    }

    #[test]
    fn empty_identity_denies_everyone() {
        let gate = IdentityGate::new("");
        assert!(!gate.check("").is_allowed());
        assert!(!gate.check("anyone").is_allowed());
    }
}
