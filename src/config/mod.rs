//! Engine configuration.
//!
//! Configuration is read once at startup from environment-style key/value
//! pairs (optionally layered over a config file), validated, and then handed to
//! the engine as an immutable [`Config`]. Keys are matched case-insensitively;
//! a config file uses the same keys in lowercase.

use crate::error::ErrorContext;
use crate::policy::{BlocklistTable, CheckKind, EnforcementMode, BLOCKLIST_KEY, BLOCK_KEY};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Key selecting the DMARC check mode.
pub const DMARC_MODE_KEY: &str = "DMARC_BLOCK_MODE";

/// Key selecting the spam check mode.
pub const SPAM_MODE_KEY: &str = "SPAM_BLOCK_MODE";

/// Key selecting the virus check mode.
pub const VIRUS_MODE_KEY: &str = "VIRUS_BLOCK_MODE";

/// Key selecting which checks run.
pub const CHECKS_KEY: &str = "CHECKS";

/// Lowercase names of every recognised setting.
const SETTING_KEYS: [&str; 6] = [
    "block",
    "blocklist",
    "dmarc_block_mode",
    "spam_block_mode",
    "virus_block_mode",
    "checks",
];

/// Recognised settings present in the process environment. Variables that are
/// not valid UTF-8 are skipped.
pub fn env_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(key, _)| SETTING_KEYS.contains(&key.to_lowercase().as_str()))
        .collect()
}

/// Raw configuration values as they arrive from the sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// `domain:MODE,...`
    #[serde(default)]
    pub block: Option<String>,
    /// Monitor-only `domain,...`
    #[serde(default)]
    pub blocklist: Option<String>,
    /// `BLOCK` or anything else
    #[serde(default)]
    pub dmarc_block_mode: Option<String>,
    /// `BLOCK` or anything else
    #[serde(default)]
    pub spam_block_mode: Option<String>,
    /// `BLOCK` or anything else
    #[serde(default)]
    pub virus_block_mode: Option<String>,
    /// Comma-separated check names
    #[serde(default)]
    pub checks: Option<String>,
}

/// The set of enabled checks. Evaluation order is fixed regardless of the
/// order names were listed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSelection {
    enabled: Vec<CheckKind>,
}

impl CheckSelection {
    /// Every check enabled.
    pub fn all() -> Self {
        Self {
            enabled: CheckKind::ALL.to_vec(),
        }
    }

    /// Build a selection from check kinds.
    pub fn from_kinds(kinds: impl IntoIterator<Item = CheckKind>) -> Self {
        let mut enabled: Vec<CheckKind> = kinds.into_iter().collect();
        enabled.sort();
        enabled.dedup();
        Self { enabled }
    }

    /// Parse a comma-separated list of check names.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut kinds = Vec::new();
        for name in raw.split(',') {
            if name.trim().is_empty() {
                continue;
            }
            let kind = name
                .parse::<CheckKind>()
                .map_err(|_| Error::config_key(format!("unknown check '{}'", name.trim()), CHECKS_KEY))?;
            kinds.push(kind);
        }

        if kinds.is_empty() {
            return Err(Error::config_key("no checks enabled", CHECKS_KEY));
        }

        Ok(Self::from_kinds(kinds))
    }

    /// Check whether a check is enabled.
    pub fn contains(&self, kind: CheckKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Enabled checks in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = CheckKind> + '_ {
        self.enabled.iter().copied()
    }

    /// Number of enabled checks.
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Check whether no check is enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl Default for CheckSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Validated, immutable engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Sender-domain blocklist
    pub blocklist: BlocklistTable,
    /// DMARC check mode
    pub dmarc_mode: EnforcementMode,
    /// Spam check mode
    pub spam_mode: EnforcementMode,
    /// Virus check mode
    pub virus_mode: EnforcementMode,
    /// Enabled checks
    pub checks: CheckSelection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocklist: BlocklistTable::new(),
            dmarc_mode: EnforcementMode::Monitor,
            spam_mode: EnforcementMode::Monitor,
            virus_mode: EnforcementMode::Monitor,
            checks: CheckSelection::all(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None::<&Path>)
    }

    /// Load configuration from an optional file, overridden by the process
    /// environment.
    pub fn load(file: Option<impl AsRef<Path>>) -> Result<Self> {
        Self::load_from(file, env_vars())
    }

    /// Build configuration from explicit key/value pairs. Keys are matched
    /// case-insensitively; unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::load_from(None::<&Path>, vars)
    }

    /// Load configuration from an optional file with key/value pairs layered
    /// on top. Pairs win over the file, and a later pair wins over an earlier
    /// one with the same key. Nothing is validated until every layer is
    /// applied.
    pub fn load_from<I, K, V>(file: Option<impl AsRef<Path>>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path.as_ref()));
        }
        for (key, value) in vars {
            let key = key.as_ref().to_lowercase();
            if !SETTING_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value: String = value.into();
            builder = builder.set_override(key, value)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        Self::from_settings(settings)
    }

    /// Validate raw settings into a configuration.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let mut blocklist = match settings.block.as_deref() {
            Some(raw) => BlocklistTable::parse(raw).with_key(BLOCK_KEY)?,
            None => BlocklistTable::new(),
        };
        if let Some(raw) = settings.blocklist.as_deref() {
            blocklist.merge_missing(BlocklistTable::parse_monitor_list(raw).with_key(BLOCKLIST_KEY)?);
        }

        let checks = match settings.checks.as_deref() {
            Some(raw) => CheckSelection::parse(raw)?,
            None => CheckSelection::all(),
        };

        if checks.contains(CheckKind::Blocklist) && blocklist.is_empty() {
            warn!("Blocklist check enabled but no {} entries configured", BLOCK_KEY);
        }

        let config = Self {
            blocklist,
            dmarc_mode: EnforcementMode::from_setting(settings.dmarc_block_mode.as_deref()),
            spam_mode: EnforcementMode::from_setting(settings.spam_block_mode.as_deref()),
            virus_mode: EnforcementMode::from_setting(settings.virus_block_mode.as_deref()),
            checks,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.checks.is_empty() {
            return Err(Error::config_key("no checks enabled", CHECKS_KEY));
        }
        Ok(())
    }

    /// Replace the enabled checks.
    pub fn with_checks(mut self, checks: CheckSelection) -> Self {
        self.checks = checks;
        self
    }

    /// Check whether a check is enabled.
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        self.checks.contains(kind)
    }

    /// Mode configured for a verdict check. The blocklist has per-domain
    /// modes and returns `None`.
    pub fn mode_for(&self, kind: CheckKind) -> Option<EnforcementMode> {
        match kind {
            CheckKind::Blocklist => None,
            CheckKind::Dmarc => Some(self.dmarc_mode),
            CheckKind::Spam => Some(self.spam_mode),
            CheckKind::Virus => Some(self.virus_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::<(&str, &str)>::new()).unwrap();
        assert!(config.blocklist.is_empty());
        assert_eq!(config.dmarc_mode, EnforcementMode::Monitor);
        assert_eq!(config.spam_mode, EnforcementMode::Monitor);
        assert_eq!(config.virus_mode, EnforcementMode::Monitor);
        assert_eq!(config.checks, CheckSelection::all());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_configuration() {
        let config = Config::from_vars([
            ("BLOCK", "gmail.com:BLOCK,linkedin.com:MONITOR"),
            ("DMARC_BLOCK_MODE", "BLOCK"),
            ("SPAM_BLOCK_MODE", "MONITOR"),
            ("VIRUS_BLOCK_MODE", "BLOCK"),
        ])
        .unwrap();

        assert_eq!(config.blocklist.len(), 2);
        assert_eq!(config.blocklist.get("gmail.com"), Some(EnforcementMode::Block));
        assert_eq!(config.mode_for(CheckKind::Dmarc), Some(EnforcementMode::Block));
        assert_eq!(config.mode_for(CheckKind::Spam), Some(EnforcementMode::Monitor));
        assert_eq!(config.mode_for(CheckKind::Virus), Some(EnforcementMode::Block));
        assert_eq!(config.mode_for(CheckKind::Blocklist), None);
    }

    #[test]
    fn test_mode_tokens_are_exact() {
        let config = Config::from_vars([("SPAM_BLOCK_MODE", "block")]).unwrap();
        assert_eq!(config.spam_mode, EnforcementMode::Monitor);
    }

    #[test]
    fn test_malformed_block_is_fatal() {
        let err = Config::from_vars([("BLOCK", "gmail.com:BLOCK,yahoo.com")]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.key(), Some(BLOCK_KEY));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_legacy_blocklist_merges_as_monitor() {
        let config = Config::from_vars([
            ("BLOCK", "a.com:BLOCK"),
            ("BLOCKLIST", "a.com,b.com"),
        ])
        .unwrap();

        assert_eq!(config.blocklist.get("a.com"), Some(EnforcementMode::Block));
        assert_eq!(config.blocklist.get("b.com"), Some(EnforcementMode::Monitor));
    }

    #[test]
    fn test_malformed_legacy_blocklist_is_fatal() {
        let err = Config::from_vars([("BLOCKLIST", "a.com,,b.com")]).unwrap_err();
        assert_eq!(err.key(), Some(BLOCKLIST_KEY));
    }

    #[test]
    fn test_check_selection() {
        let config = Config::from_vars([("CHECKS", "spam, dmarc")]).unwrap();
        assert!(config.is_enabled(CheckKind::Spam));
        assert!(config.is_enabled(CheckKind::Dmarc));
        assert!(!config.is_enabled(CheckKind::Blocklist));
        assert_eq!(
            config.checks.iter().collect::<Vec<_>>(),
            vec![CheckKind::Dmarc, CheckKind::Spam]
        );
    }

    #[test]
    fn test_bad_check_selection() {
        let err = Config::from_vars([("CHECKS", "spam,rbl")]).unwrap_err();
        assert_eq!(err.key(), Some(CHECKS_KEY));

        let err = Config::from_vars([("CHECKS", " , ")]).unwrap_err();
        assert_eq!(err.key(), Some(CHECKS_KEY));
    }

    #[test]
    fn test_later_pair_wins_before_validation() {
        let config = Config::from_vars([("CHECKS", "spam,rbl"), ("checks", "virus")]).unwrap();
        assert_eq!(config.checks, CheckSelection::from_kinds([CheckKind::Virus]));
    }

    #[test]
    fn test_unrecognised_keys_are_ignored() {
        let config = Config::from_vars([("PATH", "/usr/bin"), ("weird[0", "x")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_vars_override_file() {
        let path = std::env::temp_dir().join(format!("settings-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "block = \"x.com:MONITOR\"\nspam_block_mode = \"BLOCK\"\n").unwrap();

        let config = Config::load_from(Some(&path), [("BLOCK", "x.com:BLOCK")]);
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.blocklist.get("x.com"), Some(EnforcementMode::Block));
        assert_eq!(config.spam_mode, EnforcementMode::Block);
    }

    #[test]
    fn test_validate_rejects_empty_selection() {
        let config = Config::default().with_checks(CheckSelection::from_kinds(Vec::<CheckKind>::new()));
        assert!(config.validate().is_err());
    }
}
