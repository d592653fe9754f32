//! Identity enforcement and audit logging for Daybook.
//!
//! The deployment is single-user: exactly one authorized identity exists
//! per process lifetime, and every inbound message is checked against it
//! before anything else runs.

pub mod audit;
pub mod gate;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use gate::{Access, IdentityGate};
