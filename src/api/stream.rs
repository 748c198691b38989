//! Newline-delimited event streams.
//!
//! Every input line gets exactly one output line, in order, so callers can
//! pair answers with requests by position. A line that does not decode gets
//! a [`StreamError`] line instead of a disposition.

use super::{DispositionEngine, ReceiptEvent};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

/// Output line for an input line that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    /// Why the line was rejected
    pub error: String,
    /// 1-based input line number
    pub line: usize,
}

/// Counts for a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Input lines read
    pub lines: usize,
    /// Lines answered with a disposition or report
    pub answered: usize,
    /// Lines answered with an error
    pub rejected: usize,
}

/// The rendered output line for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAnswer {
    /// A disposition or report
    Answered(String),
    /// A serialized [`StreamError`]
    Rejected(String),
}

impl LineAnswer {
    /// The JSON line to write.
    pub fn as_str(&self) -> &str {
        match self {
            LineAnswer::Answered(line) | LineAnswer::Rejected(line) => line,
        }
    }

    /// Check if the input line was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, LineAnswer::Rejected(_))
    }
}

/// Render the output line for one input line.
pub fn answer_line(engine: &DispositionEngine, line: &str, line_number: usize, report: bool) -> Result<LineAnswer> {
    let event = match ReceiptEvent::from_json(line) {
        Ok(event) => event,
        Err(e) => {
            let err = Error::parse_at(format!("invalid receipt event: {}", e), line_number);
            error!(line = line_number, category = err.category(), "{}", err);
            let rejected = StreamError {
                error: err.to_string(),
                line: line_number,
            };
            return Ok(LineAnswer::Rejected(serde_json::to_string(&rejected)?));
        }
    };

    let answer = if report {
        serde_json::to_string(&engine.evaluate_event(&event))?
    } else {
        serde_json::to_string(&engine.handle(&event))?
    };
    Ok(LineAnswer::Answered(answer))
}

/// Answer every line of `input` on `output` until EOF.
pub async fn serve_lines<R, W>(engine: &DispositionEngine, input: R, output: &mut W, report: bool) -> Result<StreamSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = StreamSummary::default();

    while let Some(line) = lines.next_line().await? {
        summary.lines += 1;

        let answer = answer_line(engine, &line, summary.lines, report)?;
        if answer.is_rejected() {
            summary.rejected += 1;
        } else {
            summary.answered += 1;
        }

        output.write_all(answer.as_str().as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::telemetry::MemoryAuditSink;
    use std::sync::Arc;

    fn engine() -> DispositionEngine {
        DispositionEngine::builder()
            .with_config(Config::from_vars([("BLOCK", "bad.com:BLOCK")]).unwrap())
            .with_audit_sink(Arc::new(MemoryAuditSink::new()))
            .build()
            .unwrap()
    }

    fn event(message_id: &str, from: &str) -> String {
        format!(
            r#"{{"Records":[{{"ses":{{"mail":{{"messageId":"{}","commonHeaders":{{"from":["{}"]}}}}}}}}]}}"#,
            message_id, from
        )
    }

    #[tokio::test]
    async fn test_bad_line_keeps_answers_aligned() {
        let input = format!(
            "{}\n{}\n{}\n",
            event("m-1", "a@bad.com"),
            r#"{"Records":[{"ses":{"mail":{"messageId":null}}}]}"#,
            event("m-3", "a@good.com"),
        );
        let mut output = Vec::new();

        let summary = serve_lines(&engine(), input.as_bytes(), &mut output, false)
            .await
            .unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"disposition":"CONTINUE"}"#);
        let rejected: StreamError = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(rejected.line, 2);
        assert!(rejected.error.contains("invalid receipt event"));
        assert_eq!(lines[2], r#"{"disposition":"STOP_RULE"}"#);

        assert_eq!(
            summary,
            StreamSummary {
                lines: 3,
                answered: 2,
                rejected: 1
            }
        );
    }

    #[tokio::test]
    async fn test_blank_line_is_answered() {
        let input = format!("{}\n\n", event("m-1", "a@good.com"));
        let mut output = Vec::new();

        let summary = serve_lines(&engine(), input.as_bytes(), &mut output, false)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn test_answer_line_report() {
        let answer = answer_line(&engine(), &event("m-1", "a@bad.com"), 1, true).unwrap();
        assert!(!answer.is_rejected());
        let report: serde_json::Value = serde_json::from_str(answer.as_str()).unwrap();
        assert_eq!(report["disposition"], "halt");
        assert_eq!(report["records_evaluated"], 1);
    }
}
