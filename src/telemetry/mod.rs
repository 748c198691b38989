//! Telemetry and audit output for the disposition engine.
//!
//! Counters are kept in-process with atomics and can be snapshotted into a
//! serializable [`TelemetryMetrics`]. Audit lines are routed through an
//! [`AuditSink`].

mod audit;

pub use audit::{AuditSink, MemoryAuditSink, TracingAuditSink, AUDIT_TARGET};

use crate::policy::{BatchDisposition, CheckStatus};

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for evaluated batches and check outcomes.
#[derive(Debug, Default)]
pub struct Telemetry {
    /// Batch counters by disposition
    batches_allow: AtomicU64,
    batches_halt: AtomicU64,
    /// Records evaluated across all batches
    records: AtomicU64,
    /// Outcome counters by status
    outcomes_pass: AtomicU64,
    outcomes_monitor: AtomicU64,
    outcomes_block: AtomicU64,
    /// Sender addresses skipped because no domain could be parsed
    skipped_addresses: AtomicU64,
    /// Total evaluation time in microseconds
    total_evaluation_time_us: AtomicU64,
}

impl Telemetry {
    /// Create a new telemetry instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check outcome.
    pub fn record_outcome(&self, status: CheckStatus) {
        match status {
            CheckStatus::Pass => self.outcomes_pass.fetch_add(1, Ordering::Relaxed),
            CheckStatus::Monitored => self.outcomes_monitor.fetch_add(1, Ordering::Relaxed),
            CheckStatus::Blocked => self.outcomes_block.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record sender addresses that could not be parsed.
    pub fn record_skipped(&self, count: usize) {
        self.skipped_addresses
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a finished batch.
    pub fn record_batch(&self, disposition: BatchDisposition, records: usize, duration_ms: f64) {
        match disposition {
            BatchDisposition::Allow => self.batches_allow.fetch_add(1, Ordering::Relaxed),
            BatchDisposition::Halt => self.batches_halt.fetch_add(1, Ordering::Relaxed),
        };
        self.records.fetch_add(records as u64, Ordering::Relaxed);

        let duration_us = (duration_ms * 1000.0) as u64;
        self.total_evaluation_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Get current metrics.
    pub fn metrics(&self) -> TelemetryMetrics {
        let batches_allow = self.batches_allow.load(Ordering::Relaxed);
        let batches_halt = self.batches_halt.load(Ordering::Relaxed);
        let total_batches = batches_allow + batches_halt;

        let total_time_us = self.total_evaluation_time_us.load(Ordering::Relaxed);
        let avg_evaluation_time_ms = if total_batches > 0 {
            (total_time_us as f64 / total_batches as f64) / 1000.0
        } else {
            0.0
        };

        TelemetryMetrics {
            total_batches,
            batches_allow,
            batches_halt,
            records: self.records.load(Ordering::Relaxed),
            outcomes_pass: self.outcomes_pass.load(Ordering::Relaxed),
            outcomes_monitor: self.outcomes_monitor.load(Ordering::Relaxed),
            outcomes_block: self.outcomes_block.load(Ordering::Relaxed),
            skipped_addresses: self.skipped_addresses.load(Ordering::Relaxed),
            avg_evaluation_time_ms,
        }
    }
}

/// Metrics collected by telemetry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TelemetryMetrics {
    /// Total number of evaluated batches
    pub total_batches: u64,
    /// Batches that were allowed
    pub batches_allow: u64,
    /// Batches that were halted
    pub batches_halt: u64,
    /// Records evaluated
    pub records: u64,
    /// Pass outcomes
    pub outcomes_pass: u64,
    /// Monitored outcomes
    pub outcomes_monitor: u64,
    /// Blocked outcomes
    pub outcomes_block: u64,
    /// Unparseable sender addresses
    pub skipped_addresses: u64,
    /// Average evaluation time per batch in milliseconds
    pub avg_evaluation_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_batches() {
        let telemetry = Telemetry::new();

        telemetry.record_batch(BatchDisposition::Allow, 2, 1.0);
        telemetry.record_batch(BatchDisposition::Halt, 1, 3.0);
        telemetry.record_batch(BatchDisposition::Allow, 4, 2.0);

        let metrics = telemetry.metrics();
        assert_eq!(metrics.total_batches, 3);
        assert_eq!(metrics.batches_allow, 2);
        assert_eq!(metrics.batches_halt, 1);
        assert_eq!(metrics.records, 7);
        assert!((metrics.avg_evaluation_time_ms - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_outcomes() {
        let telemetry = Telemetry::new();

        telemetry.record_outcome(CheckStatus::Pass);
        telemetry.record_outcome(CheckStatus::Pass);
        telemetry.record_outcome(CheckStatus::Monitored);
        telemetry.record_outcome(CheckStatus::Blocked);
        telemetry.record_skipped(2);

        let metrics = telemetry.metrics();
        assert_eq!(metrics.outcomes_pass, 2);
        assert_eq!(metrics.outcomes_monitor, 1);
        assert_eq!(metrics.outcomes_block, 1);
        assert_eq!(metrics.skipped_addresses, 2);
        assert_eq!(metrics.avg_evaluation_time_ms, 0.0);
    }
}
