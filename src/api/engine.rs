//! Disposition engine implementation.

use super::{BatchReport, DispositionResponse, ReceiptEvent};
use crate::config::Config;
use crate::core::PolicyEvaluator;
use crate::policy::{BatchDisposition, CheckKind, MessageRecord};
use crate::telemetry::{AuditSink, Telemetry, TelemetryMetrics};
use crate::Result;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The main entry point: evaluates receipt events and answers with a
/// disposition for the mail transport.
///
/// The engine is immutable after construction and can be shared across
/// threads behind an `Arc`.
pub struct DispositionEngine {
    /// Batch evaluator
    evaluator: PolicyEvaluator,
    /// Telemetry instance
    telemetry: Option<Arc<Telemetry>>,
    /// Configuration
    config: Config,
}

impl DispositionEngine {
    /// Create a disposition engine builder.
    pub fn builder() -> DispositionEngineBuilder {
        DispositionEngineBuilder::new()
    }

    /// Create a new engine with the given configuration, auditing to
    /// `tracing` and without telemetry.
    pub fn new(config: Config) -> Self {
        Self {
            evaluator: PolicyEvaluator::new(&config),
            telemetry: None,
            config,
        }
    }

    /// Answer a receipt event.
    ///
    /// A well-formed event never produces an error; unparseable senders and
    /// unknown verdict labels are tolerated.
    pub fn handle(&self, event: &ReceiptEvent) -> DispositionResponse {
        self.evaluate_event(event).response()
    }

    /// Decode a JSON receipt event and answer it.
    pub fn handle_json(&self, json: &str) -> Result<DispositionResponse> {
        let event = ReceiptEvent::from_json(json)?;
        Ok(self.handle(&event))
    }

    /// Evaluate a receipt event and return the full report.
    pub fn evaluate_event(&self, event: &ReceiptEvent) -> BatchReport {
        self.evaluator.evaluate_report(&event.message_records())
    }

    /// Evaluate message records directly.
    pub fn evaluate(&self, records: &[MessageRecord]) -> BatchDisposition {
        self.evaluator.evaluate(records)
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get engine metrics.
    pub fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            enabled_checks: self.evaluator.check_kinds(),
            blocklist_entries: self.config.blocklist.len(),
            telemetry_enabled: self.telemetry.is_some(),
            telemetry: self.telemetry.as_ref().map(|t| t.metrics()),
        }
    }
}

impl std::fmt::Debug for DispositionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispositionEngine")
            .field("evaluator", &self.evaluator)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for creating a DispositionEngine.
#[derive(Default)]
pub struct DispositionEngineBuilder {
    config: Option<Config>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    telemetry_enabled: bool,
}

impl DispositionEngineBuilder {
    /// Create a new engine builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Send audit lines to the given sink instead of `tracing`.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Enable or disable telemetry.
    pub fn with_telemetry_enabled(mut self, enabled: bool) -> Self {
        self.telemetry_enabled = enabled;
        self
    }

    /// Build the engine.
    pub fn build(self) -> Result<DispositionEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut evaluator = PolicyEvaluator::new(&config);
        if let Some(sink) = self.audit_sink {
            evaluator = evaluator.with_audit_sink(sink);
        }

        let telemetry = if self.telemetry_enabled {
            let telemetry = Arc::new(Telemetry::new());
            evaluator = evaluator.with_telemetry(telemetry.clone());
            Some(telemetry)
        } else {
            None
        };

        Ok(DispositionEngine {
            evaluator,
            telemetry,
            config,
        })
    }
}

/// Engine metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineMetrics {
    /// Enabled checks in evaluation order
    pub enabled_checks: Vec<CheckKind>,
    /// Number of configured blocklist domains
    pub blocklist_entries: usize,
    /// Whether telemetry is enabled
    pub telemetry_enabled: bool,
    /// Telemetry counters (if telemetry is enabled)
    pub telemetry: Option<TelemetryMetrics>,
}
