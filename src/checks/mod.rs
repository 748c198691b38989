//! Compliance checks.
//!
//! Each check inspects one signal of a [`MessageRecord`] and reports outcomes;
//! the evaluator writes them to the audit sink and folds them into the batch
//! disposition. Checks are immutable after construction and shareable across
//! threads.

mod blocklist;
mod verdict;

pub use blocklist::{extract_domain, BlocklistCheck};
pub use verdict::VerdictCheck;

use crate::config::Config;
use crate::policy::{CheckKind, CheckOutcome, CheckStatus, MessageRecord};

/// Outcomes of one check against one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckEvaluation {
    /// Outcomes in the order they were produced, one audit line each
    pub outcomes: Vec<CheckOutcome>,
    /// Raw sender addresses that could not be parsed and were skipped
    pub skipped: Vec<String>,
}

impl CheckEvaluation {
    /// An evaluation holding a single outcome.
    pub fn single(outcome: CheckOutcome) -> Self {
        Self {
            outcomes: vec![outcome],
            skipped: Vec::new(),
        }
    }

    /// Most severe status among the outcomes; `Pass` when there are none.
    pub fn status(&self) -> CheckStatus {
        self.outcomes
            .iter()
            .map(|o| o.status)
            .max()
            .unwrap_or_default()
    }
}

/// A compliance check.
pub trait Check: Send + Sync {
    /// Which check this is.
    fn kind(&self) -> CheckKind;

    /// Evaluate one record.
    fn evaluate(&self, record: &MessageRecord) -> CheckEvaluation;
}

/// Build the enabled checks from configuration, in evaluation order
/// (blocklist, DMARC, spam, virus).
pub fn build_checks(config: &Config) -> Vec<Box<dyn Check>> {
    let mut checks: Vec<Box<dyn Check>> = Vec::with_capacity(CheckKind::ALL.len());

    for kind in CheckKind::ALL {
        if !config.is_enabled(kind) {
            continue;
        }
        let check: Box<dyn Check> = match kind {
            CheckKind::Blocklist => Box::new(BlocklistCheck::new(config.blocklist.clone())),
            CheckKind::Dmarc => Box::new(VerdictCheck::dmarc(config.dmarc_mode)),
            CheckKind::Spam => Box::new(VerdictCheck::spam(config.spam_mode)),
            CheckKind::Virus => Box::new(VerdictCheck::virus(config.virus_mode)),
        };
        checks.push(check);
    }

    checks
}
