//! Verdict-label checks: DMARC, spam and virus.
//!
//! The three checks share one implementation; they differ only in which
//! verdict they read, their log tag and whether the SPF/DKIM sub-verdicts are
//! attached for diagnosis.

use super::{Check, CheckEvaluation};
use crate::policy::{CheckKind, CheckOutcome, CheckStatus, EnforcementMode, MessageRecord, Verdict};

type VerdictSelector = fn(&MessageRecord) -> &Verdict;

fn dmarc_verdict(record: &MessageRecord) -> &Verdict {
    &record.dmarc
}

fn spam_verdict(record: &MessageRecord) -> &Verdict {
    &record.spam
}

fn virus_verdict(record: &MessageRecord) -> &Verdict {
    &record.virus
}

/// A check that triggers when one verdict label is exactly `FAIL`.
#[derive(Clone)]
pub struct VerdictCheck {
    kind: CheckKind,
    mode: EnforcementMode,
    select: VerdictSelector,
    with_auth_details: bool,
}

impl VerdictCheck {
    /// DMARC authentication check.
    pub fn dmarc(mode: EnforcementMode) -> Self {
        Self {
            kind: CheckKind::Dmarc,
            mode,
            select: dmarc_verdict,
            with_auth_details: true,
        }
    }

    /// Spam verdict check.
    pub fn spam(mode: EnforcementMode) -> Self {
        Self {
            kind: CheckKind::Spam,
            mode,
            select: spam_verdict,
            with_auth_details: false,
        }
    }

    /// Virus verdict check.
    pub fn virus(mode: EnforcementMode) -> Self {
        Self {
            kind: CheckKind::Virus,
            mode,
            select: virus_verdict,
            with_auth_details: false,
        }
    }

    /// Evaluate a record under an explicit mode.
    pub fn evaluate_with(&self, record: &MessageRecord, mode: EnforcementMode) -> CheckOutcome {
        let status = match ((self.select)(record).is_fail(), mode) {
            (false, _) => CheckStatus::Pass,
            (true, EnforcementMode::Block) => CheckStatus::Blocked,
            (true, EnforcementMode::Monitor) => CheckStatus::Monitored,
        };

        let outcome = CheckOutcome::new(self.kind, status, &record.message_id);
        if self.with_auth_details {
            outcome
                .with_field("SPF", &record.spf)
                .with_field("DKIM", &record.dkim)
        } else {
            outcome
        }
    }
}

impl std::fmt::Debug for VerdictCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerdictCheck")
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Check for VerdictCheck {
    fn kind(&self) -> CheckKind {
        self.kind
    }

    fn evaluate(&self, record: &MessageRecord) -> CheckEvaluation {
        CheckEvaluation::single(self.evaluate_with(record, self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_dmarc() -> MessageRecord {
        MessageRecord::builder("msg-1")
            .dmarc("FAIL")
            .spf("PASS")
            .dkim("FAIL")
            .build()
    }

    #[test]
    fn test_dmarc_block() {
        let outcome = VerdictCheck::dmarc(EnforcementMode::Block).evaluate_with(&failing_dmarc(), EnforcementMode::Block);
        assert_eq!(outcome.status, CheckStatus::Blocked);
        assert_eq!(outcome.audit_line(), "MessageID=msg-1 STATUS=BLOCK SPF=PASS DKIM=FAIL");
    }

    #[test]
    fn test_dmarc_monitor() {
        let check = VerdictCheck::dmarc(EnforcementMode::Monitor);
        let evaluation = check.evaluate(&failing_dmarc());
        assert_eq!(evaluation.outcomes.len(), 1);
        assert_eq!(evaluation.status(), CheckStatus::Monitored);
        assert_eq!(
            evaluation.outcomes[0].audit_line(),
            "MessageID=msg-1 STATUS=MONITOR SPF=PASS DKIM=FAIL"
        );
    }

    #[test]
    fn test_dmarc_pass_still_logs_sub_verdicts() {
        let record = MessageRecord::builder("msg-2").dmarc("PASS").build();
        let outcome = VerdictCheck::dmarc(EnforcementMode::Block).evaluate_with(&record, EnforcementMode::Block);
        assert_eq!(outcome.status, CheckStatus::Pass);
        assert_eq!(outcome.audit_line(), "MessageID=msg-2 STATUS=PASS SPF=NONE DKIM=NONE");
    }

    #[test]
    fn test_spam_and_virus_are_independent() {
        let record = MessageRecord::builder("msg-3").spam("FAIL").virus("PASS").build();

        let spam = VerdictCheck::spam(EnforcementMode::Block).evaluate(&record);
        let virus = VerdictCheck::virus(EnforcementMode::Block).evaluate(&record);

        assert_eq!(spam.status(), CheckStatus::Blocked);
        assert_eq!(virus.status(), CheckStatus::Pass);
        assert_eq!(spam.outcomes[0].audit_line(), "MessageID=msg-3 STATUS=BLOCK");
        assert_eq!(virus.outcomes[0].check, CheckKind::Virus);
    }

    #[test]
    fn test_unrecognized_labels_pass() {
        for label in ["GRAY", "PROCESSING_FAILED", "DISABLED", "fail", ""] {
            let record = MessageRecord::builder("msg-4").virus(label).build();
            let evaluation = VerdictCheck::virus(EnforcementMode::Block).evaluate(&record);
            assert_eq!(evaluation.status(), CheckStatus::Pass, "label {label:?}");
        }
    }

    #[test]
    fn test_missing_verdict_passes() {
        let record = MessageRecord::new("msg-5");
        let evaluation = VerdictCheck::spam(EnforcementMode::Block).evaluate(&record);
        assert_eq!(evaluation.status(), CheckStatus::Pass);
    }
}
