//! # Mail Disposition Engine
//!
//! Inbound mail disposition policy engine. Given a batch of received-message
//! metadata it decides whether the mail pipeline should continue normally or
//! halt, and writes an audit line for every check it runs.
//!
//! ## Features
//!
//! - **Sender Blocklist**: Per-domain `BLOCK` or `MONITOR` enforcement
//! - **Verdict Checks**: DMARC, spam and virus verdicts, each with its own mode
//! - **Batch Disposition**: One decision per batch, halting if anything blocks
//! - **Audit Trail**: One structured log line per check outcome
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mail_disposition_engine::{Config, DispositionEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_vars([
//!         ("BLOCK", "spam.example:BLOCK,newsletter.example:MONITOR"),
//!         ("DMARC_BLOCK_MODE", "BLOCK"),
//!     ])?;
//!
//!     let engine = DispositionEngine::builder()
//!         .with_config(config)
//!         .with_telemetry_enabled(true)
//!         .build()?;
//!
//!     let event = std::fs::read_to_string("event.json")?;
//!     let response = engine.handle_json(&event)?;
//!     println!("{}", response.disposition);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod checks;
pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod telemetry;

// Re-export main types for convenience
pub use api::{
    BatchReport, DispositionEngine, DispositionEngineBuilder, DispositionResponse, ReceiptEvent,
};
pub use crate::config::{CheckSelection, Config};
pub use crate::core::PolicyEvaluator;
pub use error::{Error, Result};
pub use policy::{
    encode, BatchDisposition, BlocklistTable, CheckKind, CheckOutcome, CheckStatus,
    EnforcementMode, MessageRecord, Verdict,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
