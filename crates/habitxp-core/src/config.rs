//! Engine configuration.
//!
//! Fixed rule constants (penalty amounts, retention window, duplicate
//! guard) live as named constants in their owning modules; this config
//! carries only the knobs the embedding application resolves: the
//! streak-freeze duration unit and the fallback reward used when the
//! oracle is rate limited. Parsed from TOML by the embedding application;
//! the core does no file I/O.

use serde::{Deserialize, Serialize};

use crate::bonus::FreezeDurationUnit;
use crate::error::ConfigError;

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Unit applied to a streak-freeze bonus's duration value.
    #[serde(default)]
    pub freeze_duration_unit: FreezeDurationUnit,
    /// Reward substituted when the oracle is rate limited.
    #[serde(default = "default_reward")]
    pub default_reward: u32,
}

fn default_reward() -> u32 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            freeze_duration_unit: FreezeDurationUnit::default(),
            default_reward: default_reward(),
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML document. Missing keys fall back to defaults.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Serialize to a TOML document.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }
}
