//! Disposition response and batch report types.

use crate::policy::{encode, BatchDisposition, CheckStatus, ALLOW_TOKEN, HALT_TOKEN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// The response returned to the invoking mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionResponse {
    /// `STOP_RULE` or `CONTINUE`
    pub disposition: String,
}

impl DispositionResponse {
    /// Encode a batch disposition.
    pub fn new(disposition: BatchDisposition) -> Self {
        Self {
            disposition: encode(disposition).to_string(),
        }
    }

    /// Decode the token back into a disposition, if it is one we produce.
    pub fn decision(&self) -> Option<BatchDisposition> {
        match self.disposition.as_str() {
            ALLOW_TOKEN => Some(BatchDisposition::Allow),
            HALT_TOKEN => Some(BatchDisposition::Halt),
            _ => None,
        }
    }
}

impl From<BatchDisposition> for DispositionResponse {
    fn from(disposition: BatchDisposition) -> Self {
        Self::new(disposition)
    }
}

/// Outcome counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Outcomes that passed
    pub pass: usize,
    /// Outcomes that were only monitored
    pub monitored: usize,
    /// Outcomes that blocked
    pub blocked: usize,
}

impl StatusCounts {
    /// Count one outcome.
    pub fn add(&mut self, status: CheckStatus) {
        match status {
            CheckStatus::Pass => self.pass += 1,
            CheckStatus::Monitored => self.monitored += 1,
            CheckStatus::Blocked => self.blocked += 1,
        }
    }

    /// Total number of outcomes.
    pub fn total(&self) -> usize {
        self.pass + self.monitored + self.blocked
    }
}

/// The result of evaluating one batch, with statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique id of this evaluation
    pub batch_id: Uuid,
    /// When the evaluation finished
    pub evaluated_at: DateTime<Utc>,
    /// The folded disposition
    pub disposition: BatchDisposition,
    /// Number of records in the batch
    pub records_evaluated: usize,
    /// Outcome counts by status
    pub outcomes: StatusCounts,
    /// Sender addresses skipped because no domain could be parsed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_addresses: Vec<String>,
    /// Time taken for evaluation in milliseconds
    pub evaluation_time_ms: f64,
}

impl BatchReport {
    /// Create an empty report for an allowed batch.
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            evaluated_at: Utc::now(),
            disposition: BatchDisposition::Allow,
            records_evaluated: 0,
            outcomes: StatusCounts::default(),
            skipped_addresses: Vec::new(),
            evaluation_time_ms: 0.0,
        }
    }

    /// Set the evaluation time.
    pub fn with_evaluation_time(mut self, duration: Duration) -> Self {
        self.evaluation_time_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Check if the batch halts processing.
    pub fn is_halt(&self) -> bool {
        self.disposition.is_halt()
    }

    /// The transport response for this report.
    pub fn response(&self) -> DispositionResponse {
        DispositionResponse::new(self.disposition)
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
