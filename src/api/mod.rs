//! Public API for the disposition engine.
//!
//! This module provides the main interface for interacting with the engine:
//! the `DispositionEngine` facade, the receipt event model it consumes and the
//! response and report types it produces, and the newline-delimited stream
//! driver used by the daemon.

mod decision;
mod engine;
mod event;
mod stream;

pub use decision::{BatchReport, DispositionResponse, StatusCounts};
pub use engine::{DispositionEngine, DispositionEngineBuilder, EngineMetrics};
pub use stream::{answer_line, serve_lines, LineAnswer, StreamError, StreamSummary};
pub use event::{
    CommonHeaders, Mail, MailReceipt, Receipt, ReceiptEvent, ReceiptRecord, VerdictStatus,
};
