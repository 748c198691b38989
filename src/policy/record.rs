//! Evaluable signals of one received message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A verdict label computed upstream (authentication, spam or virus scanning).
///
/// Labels are opaque provider strings. Only the exact label `FAIL` counts as a
/// failure; missing and unrecognized labels are treated as non-failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict(Option<String>);

impl Verdict {
    /// The failing label.
    pub const FAIL: &'static str = "FAIL";

    /// The passing label.
    pub const PASS: &'static str = "PASS";

    /// Create a verdict from a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(Some(label.into()))
    }

    /// A verdict that was not supplied.
    pub fn missing() -> Self {
        Self(None)
    }

    /// Shorthand for a `PASS` verdict.
    pub fn pass() -> Self {
        Self::new(Self::PASS)
    }

    /// Shorthand for a `FAIL` verdict.
    pub fn fail() -> Self {
        Self::new(Self::FAIL)
    }

    /// Check whether this is exactly the `FAIL` label.
    pub fn is_fail(&self) -> bool {
        self.0.as_deref() == Some(Self::FAIL)
    }

    /// The raw label, if one was supplied.
    pub fn label(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(label) => f.write_str(label),
            None => f.write_str("NONE"),
        }
    }
}

impl From<&str> for Verdict {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<Option<String>> for Verdict {
    fn from(label: Option<String>) -> Self {
        Self(label)
    }
}

/// One inbound message's evaluable signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message identifier, used only in audit lines
    pub message_id: String,
    /// Declared sender addresses, as found in the `From` header
    #[serde(default)]
    pub from: Vec<String>,
    /// Spam classification verdict
    #[serde(default)]
    pub spam: Verdict,
    /// Virus scan verdict
    #[serde(default)]
    pub virus: Verdict,
    /// DMARC verdict
    #[serde(default)]
    pub dmarc: Verdict,
    /// SPF verdict (diagnostic only)
    #[serde(default)]
    pub spf: Verdict,
    /// DKIM verdict (diagnostic only)
    #[serde(default)]
    pub dkim: Verdict,
}

impl MessageRecord {
    /// Create a record with no senders and no verdicts.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ..Default::default()
        }
    }

    /// Create a record builder.
    pub fn builder(message_id: impl Into<String>) -> MessageRecordBuilder {
        MessageRecordBuilder::new(message_id)
    }
}

/// Builder for message records.
#[derive(Debug, Default)]
pub struct MessageRecordBuilder {
    record: MessageRecord,
}

impl MessageRecordBuilder {
    /// Create a new builder.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            record: MessageRecord::new(message_id),
        }
    }

    /// Add a declared sender address.
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.record.from.push(address.into());
        self
    }

    /// Set the spam verdict.
    pub fn spam(mut self, verdict: impl Into<Verdict>) -> Self {
        self.record.spam = verdict.into();
        self
    }

    /// Set the virus verdict.
    pub fn virus(mut self, verdict: impl Into<Verdict>) -> Self {
        self.record.virus = verdict.into();
        self
    }

    /// Set the DMARC verdict.
    pub fn dmarc(mut self, verdict: impl Into<Verdict>) -> Self {
        self.record.dmarc = verdict.into();
        self
    }

    /// Set the SPF verdict.
    pub fn spf(mut self, verdict: impl Into<Verdict>) -> Self {
        self.record.spf = verdict.into();
        self
    }

    /// Set the DKIM verdict.
    pub fn dkim(mut self, verdict: impl Into<Verdict>) -> Self {
        self.record.dkim = verdict.into();
        self
    }

    /// Build the record.
    pub fn build(self) -> MessageRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_fail_fails() {
        assert!(Verdict::fail().is_fail());
        assert!(!Verdict::pass().is_fail());
        assert!(!Verdict::new("fail").is_fail());
        assert!(!Verdict::new("GRAY").is_fail());
        assert!(!Verdict::new("PROCESSING_FAILED").is_fail());
        assert!(!Verdict::missing().is_fail());
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::fail().to_string(), "FAIL");
        assert_eq!(Verdict::missing().to_string(), "NONE");
    }

    #[test]
    fn test_builder() {
        let record = MessageRecord::builder("msg-1")
            .from("a@example.com")
            .from("b@example.org")
            .spam("FAIL")
            .dmarc(Verdict::pass())
            .build();

        assert_eq!(record.message_id, "msg-1");
        assert_eq!(record.from.len(), 2);
        assert!(record.spam.is_fail());
        assert!(!record.virus.is_fail());
        assert_eq!(record.virus.label(), None);
    }
}
