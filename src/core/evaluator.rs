//! Batch evaluator.

use crate::api::BatchReport;
use crate::checks::{build_checks, Check};
use crate::config::Config;
use crate::policy::{BatchDisposition, CheckKind, MessageRecord};
use crate::telemetry::{AuditSink, Telemetry, TracingAuditSink};

use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs the enabled checks over a batch and folds their outcomes into one
/// disposition.
pub struct PolicyEvaluator {
    /// Enabled checks in evaluation order
    checks: Vec<Box<dyn Check>>,
    /// Destination for audit lines
    sink: Arc<dyn AuditSink>,
    /// Optional counters
    telemetry: Option<Arc<Telemetry>>,
}

impl PolicyEvaluator {
    /// Create an evaluator for the given configuration. Audit lines go to
    /// `tracing`.
    pub fn new(config: &Config) -> Self {
        Self {
            checks: build_checks(config),
            sink: Arc::new(TracingAuditSink),
            telemetry: None,
        }
    }

    /// Route audit lines to another sink.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Record counters into the given telemetry.
    pub fn with_telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Kinds of the enabled checks, in evaluation order.
    pub fn check_kinds(&self) -> Vec<CheckKind> {
        self.checks.iter().map(|c| c.kind()).collect()
    }

    /// Evaluate a batch.
    ///
    /// Every enabled check runs for every record, even once the result is
    /// already `Halt`, so each one leaves its audit line.
    pub fn evaluate(&self, records: &[MessageRecord]) -> BatchDisposition {
        self.evaluate_report(records).disposition
    }

    /// Evaluate a batch and return the disposition with statistics.
    pub fn evaluate_report(&self, records: &[MessageRecord]) -> BatchReport {
        let start = Instant::now();
        let mut report = BatchReport::new();

        for record in records {
            for check in &self.checks {
                let evaluation = check.evaluate(record);

                for outcome in &evaluation.outcomes {
                    self.sink.record(outcome);
                    report.outcomes.add(outcome.status);
                    if let Some(ref telemetry) = self.telemetry {
                        telemetry.record_outcome(outcome.status);
                    }
                }

                if !evaluation.skipped.is_empty() {
                    if let Some(ref telemetry) = self.telemetry {
                        telemetry.record_skipped(evaluation.skipped.len());
                    }
                    report.skipped_addresses.extend(evaluation.skipped.iter().cloned());
                }

                report.disposition = report.disposition.fold(evaluation.status());
            }
        }

        report.records_evaluated = records.len();
        report = report.with_evaluation_time(start.elapsed());

        if let Some(ref telemetry) = self.telemetry {
            telemetry.record_batch(report.disposition, report.records_evaluated, report.evaluation_time_ms);
        }

        debug!(
            batch_id = %report.batch_id,
            records = report.records_evaluated,
            disposition = %report.disposition,
            "Batch evaluated"
        );

        report
    }
}

impl std::fmt::Debug for PolicyEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEvaluator")
            .field("checks", &self.check_kinds())
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}
