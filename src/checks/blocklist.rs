//! Sender-domain blocklist check.

use super::{Check, CheckEvaluation};
use crate::policy::{BlocklistTable, CheckKind, CheckOutcome, CheckStatus, EnforcementMode, MessageRecord};

use tracing::warn;

/// Evaluates every declared sender address against the blocklist table.
#[derive(Debug, Clone)]
pub struct BlocklistCheck {
    table: BlocklistTable,
}

impl BlocklistCheck {
    /// Create a check over the given table.
    pub fn new(table: BlocklistTable) -> Self {
        Self { table }
    }

    /// Outcome for a single, already extracted domain.
    pub fn check_domain(&self, message_id: &str, domain: &str) -> CheckOutcome {
        let status = match self.table.get(domain) {
            None => CheckStatus::Pass,
            Some(EnforcementMode::Monitor) => CheckStatus::Monitored,
            Some(EnforcementMode::Block) => CheckStatus::Blocked,
        };
        CheckOutcome::new(CheckKind::Blocklist, status, message_id).with_field("fromDomain", domain)
    }
}

impl Check for BlocklistCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Blocklist
    }

    fn evaluate(&self, record: &MessageRecord) -> CheckEvaluation {
        let mut evaluation = CheckEvaluation::default();

        for from in &record.from {
            match extract_domain(from) {
                Some(domain) => {
                    evaluation
                        .outcomes
                        .push(self.check_domain(&record.message_id, domain));
                }
                None => {
                    warn!(
                        message_id = %record.message_id,
                        "Cannot parse domain from {}", from
                    );
                    evaluation.skipped.push(from.clone());
                }
            }
        }

        evaluation
    }
}

/// Extract the domain of a `From` header value.
///
/// A display-name form (`Name <local@domain>`) is reduced to the bracketed
/// address first. The address must split on `@` into exactly two parts with a
/// non-empty domain; anything else yields `None`. The domain is returned as
/// written, without case folding.
pub fn extract_domain(from: &str) -> Option<&str> {
    let address = bracketed(from).unwrap_or(from).trim();

    let mut parts = address.split('@');
    let _local = parts.next()?;
    let domain = parts.next()?;
    if parts.next().is_some() || domain.is_empty() {
        return None;
    }

    Some(domain)
}

/// Contents of the last complete `<...>` pair. A trailing unclosed `<` is
/// ignored.
fn bracketed(from: &str) -> Option<&str> {
    let end = from.rfind('>')?;
    let start = from[..end].rfind('<')?;
    Some(&from[start + 1..end])
}
