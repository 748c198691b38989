//! Enforcement modes for compliance checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a triggered check halts the batch or only logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnforcementMode {
    /// Triggered checks halt the batch
    Block,
    /// Triggered checks are logged only
    Monitor,
}

impl EnforcementMode {
    /// The literal configuration token that selects `Block`.
    pub const BLOCK_TOKEN: &'static str = "BLOCK";

    /// Map a configuration token to a mode.
    ///
    /// Only the exact token `BLOCK` enables blocking; every other value,
    /// including differently cased spellings, selects monitoring.
    pub fn from_token(token: &str) -> Self {
        if token == Self::BLOCK_TOKEN {
            EnforcementMode::Block
        } else {
            EnforcementMode::Monitor
        }
    }

    /// Map an optional configuration value to a mode. Absent means `Monitor`.
    pub fn from_setting(value: Option<&str>) -> Self {
        value.map(Self::from_token).unwrap_or_default()
    }

    /// Check if this mode enforces.
    pub fn is_blocking(&self) -> bool {
        matches!(self, EnforcementMode::Block)
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::Block => "BLOCK",
            EnforcementMode::Monitor => "MONITOR",
        }
    }
}

impl Default for EnforcementMode {
    fn default() -> Self {
        EnforcementMode::Monitor
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
