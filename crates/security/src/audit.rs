//! Audit logging — structured security event logging.
//!
//! Records security-relevant events for monitoring. Intrusion attempts are
//! the headline case: every denied sender produces exactly one entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub actor: String,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
}

/// Types of auditable security events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// An unauthorized sender tried to talk to the agent
    IntrusionAttempt,
    /// A calendar tool was executed
    ToolExecution { tool_name: String },
    /// A turn failed to persist
    PersistenceFailure { session_key: String },
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// In-memory audit logger that stores entries in a vector and forwards
/// them to any configured sinks.
pub struct AuditLogger {
    entries: std::sync::Mutex<Vec<AuditEntry>>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.lock().unwrap().len();
        f.debug_struct("AuditLogger")
            .field("entry_count", &count)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
            sinks: Vec::new(),
        }
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
            sinks,
        }
    }

    /// Record an audit event.
    pub fn log(&self, event: AuditEvent, actor: &str, outcome: AuditOutcome, details: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            actor: actor.into(),
            outcome,
            details,
        };

        // Store in memory
        self.entries.lock().unwrap().push(entry.clone());

        // Forward to sinks
        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// Get all recorded entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// A tracing-based audit sink. Intrusion attempts log at `warn!` with an
/// `intrusion` marker so they stand apart from operational noise.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        match &entry.event {
            AuditEvent::IntrusionAttempt => {
                tracing::warn!(
                    severity = "intrusion",
                    actor = %entry.actor,
                    details = ?entry.details,
                    "Unauthorized access blocked"
                );
            }
            _ => {
                tracing::info!(
                    event = ?entry.event,
                    actor = %entry.actor,
                    outcome = ?entry.outcome,
                    details = ?entry.details,
                    "AUDIT"
                );
            }
        }
    }
}
