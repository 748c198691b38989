//! Per-check outcomes and their audit-line rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The compliance checks known to the engine, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Sender-domain blocklist
    Blocklist,
    /// DMARC authentication failure
    Dmarc,
    /// Spam verdict
    Spam,
    /// Virus verdict
    Virus,
}

impl CheckKind {
    /// All checks in evaluation order.
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Blocklist,
        CheckKind::Dmarc,
        CheckKind::Spam,
        CheckKind::Virus,
    ];

    /// Configuration name (`blocklist`, `dmarc`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Blocklist => "blocklist",
            CheckKind::Dmarc => "dmarc",
            CheckKind::Spam => "spam",
            CheckKind::Virus => "virus",
        }
    }

    /// Tag attached to this check's audit lines.
    pub fn log_tag(&self) -> &'static str {
        match self {
            CheckKind::Blocklist => "BLOCKLIST",
            CheckKind::Dmarc => "DMARC",
            CheckKind::Spam => "SPAM",
            CheckKind::Virus => "VIRUS",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocklist" => Ok(CheckKind::Blocklist),
            "dmarc" => Ok(CheckKind::Dmarc),
            "spam" => Ok(CheckKind::Spam),
            "virus" => Ok(CheckKind::Virus),
            _ => Err(crate::Error::parse(format!("Unknown check: {}", s))),
        }
    }
}

/// Result status of one check, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Not triggered
    Pass,
    /// Triggered, not enforced
    Monitored,
    /// Triggered and enforced
    Blocked,
}

impl CheckStatus {
    /// The `STATUS=` token written to audit lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Monitored => "MONITOR",
            CheckStatus::Blocked => "BLOCK",
        }
    }

    /// Check if this status halts the batch.
    pub fn is_blocked(&self) -> bool {
        matches!(self, CheckStatus::Blocked)
    }
}

impl Default for CheckStatus {
    fn default() -> Self {
        CheckStatus::Pass
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of evaluating one check against one record (or one sender
/// address, for the blocklist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Which check produced this outcome
    pub check: CheckKind,
    /// Outcome status
    pub status: CheckStatus,
    /// Message the outcome refers to
    pub message_id: String,
    /// Additional `key=value` context written after the status
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
}

impl CheckOutcome {
    /// Create an outcome without context fields.
    pub fn new(check: CheckKind, status: CheckStatus, message_id: impl Into<String>) -> Self {
        Self {
            check,
            status,
            message_id: message_id.into(),
            fields: Vec::new(),
        }
    }

    /// Append a `key=value` context field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Render the audit line: `MessageID=<id> STATUS=<status> <fields>`.
    pub fn audit_line(&self) -> String {
        let mut line = format!("MessageID={} STATUS={}", self.message_id, self.status);
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.check.log_tag(), self.audit_line())
    }
}
