//! Receipt event delivered by the mail transport.
//!
//! Only the fields the checks read are modelled; everything else in the
//! payload is ignored. Missing verdicts deserialize as missing labels, which
//! never trigger a check.

use crate::policy::{MessageRecord, Verdict};
use crate::Result;
use serde::{Deserialize, Serialize};

/// A batch of receipt records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEvent {
    /// Records in delivery order
    #[serde(rename = "Records", default)]
    pub records: Vec<ReceiptRecord>,
}

impl ReceiptEvent {
    /// Decode an event from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an event from message records.
    pub fn from_records(records: impl IntoIterator<Item = MessageRecord>) -> Self {
        Self {
            records: records.into_iter().map(ReceiptRecord::from).collect(),
        }
    }

    /// Convert into the records the checks evaluate, in batch order.
    pub fn message_records(&self) -> Vec<MessageRecord> {
        self.records.iter().map(ReceiptRecord::to_message_record).collect()
    }

    /// Number of records in the event.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the event carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One receipt record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    /// Origin of the event, e.g. `aws:ses`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    /// Event format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_version: Option<String>,
    /// Mail and receipt details
    #[serde(default)]
    pub ses: MailReceipt,
}

impl ReceiptRecord {
    /// Convert into a message record.
    pub fn to_message_record(&self) -> MessageRecord {
        let mail = &self.ses.mail;
        let receipt = &self.ses.receipt;

        MessageRecord {
            message_id: mail.message_id.clone(),
            from: mail.common_headers.from.clone(),
            spam: receipt.spam_verdict.to_verdict(),
            virus: receipt.virus_verdict.to_verdict(),
            dmarc: receipt.dmarc_verdict.to_verdict(),
            spf: receipt.spf_verdict.to_verdict(),
            dkim: receipt.dkim_verdict.to_verdict(),
        }
    }
}

impl From<MessageRecord> for ReceiptRecord {
    fn from(record: MessageRecord) -> Self {
        Self {
            event_source: Some("aws:ses".to_string()),
            event_version: Some("1.0".to_string()),
            ses: MailReceipt {
                mail: Mail {
                    message_id: record.message_id,
                    source: None,
                    common_headers: CommonHeaders {
                        from: record.from,
                        subject: None,
                    },
                },
                receipt: Receipt {
                    spam_verdict: VerdictStatus::from(record.spam),
                    virus_verdict: VerdictStatus::from(record.virus),
                    spf_verdict: VerdictStatus::from(record.spf),
                    dkim_verdict: VerdictStatus::from(record.dkim),
                    dmarc_verdict: VerdictStatus::from(record.dmarc),
                },
            },
        }
    }
}

/// The `ses` section of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailReceipt {
    /// Mail headers and identifiers
    #[serde(default)]
    pub mail: Mail,
    /// Verdicts computed on receipt
    #[serde(default)]
    pub receipt: Receipt,
}

/// Mail metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    /// Transport message identifier
    #[serde(default)]
    pub message_id: String,
    /// Envelope sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Parsed common headers
    #[serde(default)]
    pub common_headers: CommonHeaders,
}

/// Common headers parsed by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonHeaders {
    /// `From` header addresses
    #[serde(default)]
    pub from: Vec<String>,
    /// `Subject` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Receipt verdicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Spam classification
    #[serde(default)]
    pub spam_verdict: VerdictStatus,
    /// Virus scan
    #[serde(default)]
    pub virus_verdict: VerdictStatus,
    /// SPF authentication
    #[serde(default)]
    pub spf_verdict: VerdictStatus,
    /// DKIM authentication
    #[serde(default)]
    pub dkim_verdict: VerdictStatus,
    /// DMARC authentication
    #[serde(default)]
    pub dmarc_verdict: VerdictStatus,
}

/// A `{"status": "<label>"}` verdict object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictStatus {
    /// Provider label such as `PASS` or `FAIL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl VerdictStatus {
    /// The verdict label.
    pub fn to_verdict(&self) -> Verdict {
        Verdict::from(self.status.clone())
    }
}

impl From<Verdict> for VerdictStatus {
    fn from(verdict: Verdict) -> Self {
        Self {
            status: verdict.label().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Records": [{
            "eventSource": "aws:ses",
            "eventVersion": "1.0",
            "ses": {
                "mail": {
                    "timestamp": "2024-01-01T00:00:00.000Z",
                    "source": "bounce@example.com",
                    "messageId": "o3vrnil0e2ic28trm7dfhrc2v0clambda4nbp0g1",
                    "destination": ["recipient@example.org"],
                    "commonHeaders": {
                        "from": ["Foo Bar via LinkedIn <invitations@linkedin.com>"],
                        "subject": "hello"
                    }
                },
                "receipt": {
                    "spamVerdict": {"status": "PASS"},
                    "virusVerdict": {"status": "FAIL"},
                    "spfVerdict": {"status": "PASS"},
                    "dkimVerdict": {"status": "GRAY"},
                    "dmarcVerdict": {"status": "FAIL"},
                    "action": {"type": "Lambda"}
                }
            }
        }]
    }"#;

    #[test]
    fn test_decode_sample_event() {
        let event = ReceiptEvent::from_json(SAMPLE).unwrap();
        assert_eq!(event.len(), 1);

        let records = event.message_records();
        let record = &records[0];
        assert_eq!(record.message_id, "o3vrnil0e2ic28trm7dfhrc2v0clambda4nbp0g1");
        assert_eq!(record.from, vec!["Foo Bar via LinkedIn <invitations@linkedin.com>"]);
        assert!(record.virus.is_fail());
        assert!(record.dmarc.is_fail());
        assert!(!record.spam.is_fail());
        assert_eq!(record.dkim.label(), Some("GRAY"));
    }

    #[test]
    fn test_missing_verdicts_are_tolerated() {
        let json = r#"{"Records": [{"ses": {"mail": {"messageId": "m-1"}}}]}"#;
        let records = ReceiptEvent::from_json(json).unwrap().message_records();

        assert_eq!(records[0].message_id, "m-1");
        assert!(records[0].from.is_empty());
        assert_eq!(records[0].spam.label(), None);
        assert!(!records[0].dmarc.is_fail());
    }

    #[test]
    fn test_empty_event() {
        let event = ReceiptEvent::from_json("{}").unwrap();
        assert!(event.is_empty());
    }

    #[test]
    fn test_invalid_json_is_a_serialization_error() {
        let err = ReceiptEvent::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }

    #[test]
    fn test_from_records_preserves_signals() {
        let record = MessageRecord::builder("m-2")
            .from("a@b.com")
            .spam("FAIL")
            .spf("PASS")
            .build();
        let event = ReceiptEvent::from_records([record.clone()]);

        assert_eq!(event.message_records(), vec![record]);
    }
}
