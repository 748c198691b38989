//! Audit sinks for check outcomes.
//!
//! Every check writes one audit line per record (per sender address for the
//! blocklist). The default sink emits them as `tracing` events on the `audit`
//! target; tests and embedders can capture them instead.

use crate::policy::CheckOutcome;

use parking_lot::Mutex;
use tracing::info;

/// Tracing target used for audit lines.
pub const AUDIT_TARGET: &str = "audit";

/// Destination for audit lines.
pub trait AuditSink: Send + Sync {
    /// Record one outcome.
    fn record(&self, outcome: &CheckOutcome);
}

/// Emits audit lines as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, outcome: &CheckOutcome) {
        info!(
            target: AUDIT_TARGET,
            check = outcome.check.log_tag(),
            status = outcome.status.as_str(),
            "{}",
            outcome.audit_line()
        );
    }
}

/// Keeps outcomes in memory, in the order they were recorded.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    outcomes: Mutex<Vec<CheckOutcome>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded outcomes.
    pub fn outcomes(&self) -> Vec<CheckOutcome> {
        self.outcomes.lock().clone()
    }

    /// Recorded lines, each prefixed with the check's log tag.
    pub fn lines(&self) -> Vec<String> {
        self.outcomes.lock().iter().map(|o| o.to_string()).collect()
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.lock().len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.lock().is_empty()
    }

    /// Drop all recorded outcomes.
    pub fn clear(&self) {
        self.outcomes.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, outcome: &CheckOutcome) {
        self.outcomes.lock().push(outcome.clone());
    }
}
