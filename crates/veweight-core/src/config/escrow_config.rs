//! Top-level veweight configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{GaugeConfig, LedgerConfig, ObservabilityConfig};
use crate::errors::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VEWEIGHT_*`)
/// 2. Config file (TOML)
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EscrowConfig {
    pub ledger: LedgerConfig,
    pub gauge: GaugeConfig,
    pub observability: ObservabilityConfig,
}

impl EscrowConfig {
    /// Load configuration: defaults, then `path` (if given), then the
    /// process environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing keys keep defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `VEWEIGHT_*` overrides read through `lookup`.
    /// Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_u64 = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());
        let parse_u32 = |key: &str| lookup(key).and_then(|v| v.parse::<u32>().ok());

        if let Some(v) = parse_u64("VEWEIGHT_PERIOD_SECS") {
            self.ledger.period_secs = v;
        }
        if let Some(v) = parse_u64("VEWEIGHT_MAX_LOCK_DURATION_SECS") {
            self.ledger.max_lock_duration_secs = v;
        }
        if let Some(v) = parse_u32("VEWEIGHT_LEDGER_MAX_REPLAY_PERIODS") {
            self.ledger.max_replay_periods = v;
        }
        if let Some(v) = parse_u64("VEWEIGHT_VOTE_COOLDOWN_SECS") {
            self.gauge.vote_cooldown_secs = v;
        }
        if let Some(v) = parse_u32("VEWEIGHT_GAUGE_MAX_REPLAY_PERIODS") {
            self.gauge.max_replay_periods = v;
        }
        if let Some(v) = lookup("VEWEIGHT_LOG_LEVEL") {
            self.observability.log_level = v;
        }
        if let Some(v) = lookup("VEWEIGHT_JSON_LOGS").and_then(|v| v.parse::<bool>().ok()) {
            self.observability.json_logs = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ledger = &self.ledger;
        if ledger.period_secs == 0 {
            return Err(invalid("ledger.period_secs", "must be greater than 0"));
        }
        if ledger.max_lock_duration_secs < ledger.period_secs {
            return Err(invalid(
                "ledger.max_lock_duration_secs",
                "must span at least one period",
            ));
        }
        // One tick per period of the longest lock, plus the final partial tick.
        if u64::from(ledger.max_replay_periods) < ledger.max_lock_periods() + 1 {
            return Err(invalid(
                "ledger.max_replay_periods",
                "must cover the maximum lock duration",
            ));
        }
        if self.gauge.vote_cooldown_secs > ledger.max_lock_duration_secs {
            return Err(invalid(
                "gauge.vote_cooldown_secs",
                "must not exceed the maximum lock duration",
            ));
        }
        if self.gauge.max_replay_periods == 0 {
            return Err(invalid("gauge.max_replay_periods", "must be greater than 0"));
        }
        if !LOG_LEVELS.contains(&self.observability.log_level.as_str()) {
            return Err(invalid(
                "observability.log_level",
                "must be one of trace, debug, info, warn, error",
            ));
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
