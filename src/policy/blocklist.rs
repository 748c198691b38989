//! Sender-domain blocklist table and its configuration syntax.

use super::EnforcementMode;
use crate::{Error, Result};

use serde::Serialize;
use std::collections::HashMap;

/// Configuration key holding `domain:MODE` pairs.
pub const BLOCK_KEY: &str = "BLOCK";

/// Configuration key holding a plain, monitor-only domain list.
pub const BLOCKLIST_KEY: &str = "BLOCKLIST";

/// Mapping from sender domain to enforcement mode.
///
/// Domains are matched exactly: no case folding, no trimming. A domain that is
/// not in the table has no policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlocklistTable {
    entries: HashMap<String, EnforcementMode>,
}

impl BlocklistTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `domain1:MODE1,domain2:MODE2,...` string.
    ///
    /// `BLOCK` maps to [`EnforcementMode::Block`], any other non-empty token to
    /// [`EnforcementMode::Monitor`]. The whole string is rejected if any entry
    /// is malformed; a partially built table is never returned.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (index, entry) in raw.split(',').enumerate() {
            let (domain, mode) = parse_entry(entry, index)?;
            entries.insert(domain.to_string(), EnforcementMode::from_token(mode));
        }

        Ok(Self { entries })
    }

    /// Parse a plain comma-separated domain list into monitor-only entries.
    pub fn parse_monitor_list(raw: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (index, domain) in raw.split(',').enumerate() {
            if domain.is_empty() {
                return Err(Error::config_key(
                    format!("entry {} is empty", index + 1),
                    BLOCKLIST_KEY,
                ));
            }
            entries.insert(domain.to_string(), EnforcementMode::Monitor);
        }

        Ok(Self { entries })
    }

    /// Add entries from `other` for domains this table does not list yet.
    pub fn merge_missing(&mut self, other: BlocklistTable) {
        for (domain, mode) in other.entries {
            self.entries.entry(domain).or_insert(mode);
        }
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, domain: impl Into<String>, mode: EnforcementMode) {
        self.entries.insert(domain.into(), mode);
    }

    /// Look up the mode configured for a domain.
    pub fn get(&self, domain: &str) -> Option<EnforcementMode> {
        self.entries.get(domain).copied()
    }

    /// Check whether a domain has a configured policy.
    pub fn contains(&self, domain: &str) -> bool {
        self.entries.contains_key(domain)
    }

    /// Number of configured domains.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no domain is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of domains configured in blocking mode.
    pub fn blocking_count(&self) -> usize {
        self.entries.values().filter(|m| m.is_blocking()).count()
    }
}

fn parse_entry(entry: &str, index: usize) -> Result<(&str, &str)> {
    let position = index + 1;

    if entry.is_empty() {
        return Err(Error::config_key(
            format!("entry {} is empty", position),
            BLOCK_KEY,
        ));
    }

    let (domain, mode) = entry.split_once(':').ok_or_else(|| {
        Error::config_key(
            format!("entry {} ('{}') is missing the ':' separator", position, entry),
            BLOCK_KEY,
        )
    })?;

    if mode.contains(':') {
        return Err(Error::config_key(
            format!("entry {} ('{}') has more than one ':'", position, entry),
            BLOCK_KEY,
        ));
    }
    if domain.is_empty() {
        return Err(Error::config_key(
            format!("entry {} ('{}') has an empty domain", position, entry),
            BLOCK_KEY,
        ));
    }
    if mode.is_empty() {
        return Err(Error::config_key(
            format!("entry {} ('{}') has an empty mode", position, entry),
            BLOCK_KEY,
        ));
    }

    Ok((domain, mode))
}
