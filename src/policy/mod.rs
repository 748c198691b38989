//! Policy data structures.
//!
//! This module defines the types the checks operate on: enforcement modes,
//! the sender-domain blocklist, message records, per-check outcomes and the
//! batch disposition with its transport encoding.

mod blocklist;
mod disposition;
mod mode;
mod outcome;
mod record;

pub use blocklist::{BlocklistTable, BLOCKLIST_KEY, BLOCK_KEY};
pub use disposition::{encode, BatchDisposition, ALLOW_TOKEN, HALT_TOKEN};
pub use mode::EnforcementMode;
pub use outcome::{CheckKind, CheckOutcome, CheckStatus};
pub use record::{MessageRecord, MessageRecordBuilder, Verdict};
