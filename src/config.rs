//! Configuration with validation and defaults.
//!
//! Every amount and interval the engine charges or waits on lives
//! here, grouped into table rules and timer sections. Files are TOML;
//! missing sections and fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

/// Full engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ParlorConfig {
    pub rules: TableRules,
    pub timer: TimerConfig,
}

/// Stakes, penalties, and the outsider escalation threshold
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableRules {
    /// Bet amount used when `bet` is sent without one
    pub default_bet: u64,
    /// Flat amount the banker wins from a player who replays a round
    pub repeat_play_penalty: u64,
    /// Flat amount charged for a close attempt by a non-banker
    pub unauthorized_close_penalty: u64,
    /// Flat amount charged once outsider warnings are exhausted
    pub outsider_penalty: u64,
    /// Warnings an outsider gets before penalties start
    pub outsider_warning_limit: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            default_bet: 100,
            repeat_play_penalty: 100,
            unauthorized_close_penalty: 500,
            outsider_penalty: 200,
            outsider_warning_limit: 3,
        }
    }
}

/// Round watchdog intervals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerConfig {
    /// Grace period after the banker plays before laggards are warned
    pub grace_ms: u64,
    /// Window between the warning and forced losses
    pub final_call_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            grace_ms: 60_000,
            final_call_ms: 30_000,
        }
    }
}

impl ParlorConfig {
    /// Short intervals for exercising the watchdog in tests
    pub fn fast_test() -> Self {
        Self {
            timer: TimerConfig {
                grace_ms: 40,
                final_call_ms: 30,
            },
            ..Self::default()
        }
    }

    /// Load and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.default_bet == 0 {
            return Err(ConfigError::Invalid("default_bet must be positive".into()));
        }
        if self.rules.repeat_play_penalty == 0
            || self.rules.unauthorized_close_penalty == 0
            || self.rules.outsider_penalty == 0
        {
            return Err(ConfigError::Invalid("penalties must be positive".into()));
        }
        if self.timer.grace_ms == 0 || self.timer.final_call_ms == 0 {
            return Err(ConfigError::Invalid(
                "timer intervals must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        assert!(ParlorConfig::default().validate().is_ok());
        assert!(ParlorConfig::fast_test().validate().is_ok());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let mut config = ParlorConfig::default();
        config.timer.grace_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ParlorConfig::default();
        config.rules.default_bet = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[rules]\ndefault_bet = 50").expect("write");

        let config = ParlorConfig::from_file(file.path()).expect("load");
        assert_eq!(config.rules.default_bet, 50);
        assert_eq!(config.rules.outsider_warning_limit, 3);
        assert_eq!(config.timer.grace_ms, 60_000);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[timer]\ngrace_ms = 0").expect("write");
        assert!(ParlorConfig::from_file(file.path()).is_err());
    }
}
