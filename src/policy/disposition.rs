//! Batch dispositions and their encoding for the invoking transport.

use super::CheckStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token telling the transport to continue normal downstream processing.
pub const ALLOW_TOKEN: &str = "STOP_RULE";

/// Token telling the transport to halt the remaining stages.
pub const HALT_TOKEN: &str = "CONTINUE";

/// The single decision returned for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchDisposition {
    /// No check blocked; processing continues
    Allow,
    /// At least one check blocked; processing halts
    Halt,
}

impl BatchDisposition {
    /// Fold one more check status into this disposition.
    ///
    /// `Halt` is absorbing, so the fold is commutative and associative.
    pub fn fold(self, status: CheckStatus) -> Self {
        if status.is_blocked() {
            BatchDisposition::Halt
        } else {
            self
        }
    }

    /// Check if this disposition halts processing.
    pub fn is_halt(&self) -> bool {
        matches!(self, BatchDisposition::Halt)
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchDisposition::Allow => "allow",
            BatchDisposition::Halt => "halt",
        }
    }
}

impl Default for BatchDisposition {
    fn default() -> Self {
        BatchDisposition::Allow
    }
}

impl fmt::Display for BatchDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render a disposition in the transport's vocabulary.
///
/// The halt token is `CONTINUE`, never `STOP_RULE_SET`.
pub fn encode(disposition: BatchDisposition) -> &'static str {
    match disposition {
        BatchDisposition::Allow => ALLOW_TOKEN,
        BatchDisposition::Halt => HALT_TOKEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(BatchDisposition::Allow), "STOP_RULE");
        assert_eq!(encode(BatchDisposition::Halt), "CONTINUE");
    }

    #[test]
    fn test_fold() {
        let d = BatchDisposition::Allow
            .fold(CheckStatus::Pass)
            .fold(CheckStatus::Monitored);
        assert_eq!(d, BatchDisposition::Allow);

        let d = d.fold(CheckStatus::Blocked).fold(CheckStatus::Pass);
        assert_eq!(d, BatchDisposition::Halt);
    }
}
