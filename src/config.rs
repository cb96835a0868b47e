//! Scheduler configuration.
//!
//! Read from a TOML file whose path is given by `SHIFT_SCHEDULING_CONFIG`,
//! falling back to defaults for the file and for every missing key:
//!
//! ```toml
//! daily_cap = 5
//! unavailable_marker = "x"
//! time_limit_secs = 30
//! max_exact_solves = 2
//! bind_address = "0.0.0.0:7860"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SHIFT_SCHEDULING_CONFIG";

/// Maximum number of duties one worker may take on a single date.
pub const DEFAULT_DAILY_CAP: usize = 5;

/// Default exact-phase budget: 30 seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

/// Default number of exact-phase threads alive at once.
pub const DEFAULT_MAX_EXACT_SOLVES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on a worker's duties per date.
    pub daily_cap: usize,
    /// Cell value marking "unavailable" / "incapable". One character.
    pub unavailable_marker: String,
    /// Exact-phase budget in seconds; 0 disables the limit.
    pub time_limit_secs: u64,
    /// Exact phases allowed to run at once, timed-out ones included.
    pub max_exact_solves: usize,
    /// HTTP listen address.
    pub bind_address: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_cap: DEFAULT_DAILY_CAP,
            unavailable_marker: "x".to_string(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            max_exact_solves: DEFAULT_MAX_EXACT_SOLVES,
            bind_address: "0.0.0.0:7860".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_cap == 0 {
            return Err(ConfigError::Invalid("daily_cap must be at least 1".into()));
        }
        if self.max_exact_solves == 0 {
            return Err(ConfigError::Invalid("max_exact_solves must be at least 1".into()));
        }
        if self.unavailable_marker.trim().chars().count() != 1 {
            return Err(ConfigError::Invalid(format!(
                "unavailable_marker must be a single character, got '{}'",
                self.unavailable_marker
            )));
        }
        Ok(())
    }

    /// The reserved marker character.
    pub fn marker(&self) -> char {
        self.unavailable_marker.trim().chars().next().unwrap_or('x')
    }

    /// Exact-phase budget, `None` when unlimited.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit_secs = time_limit.map(|d| d.as_secs().max(1)).unwrap_or(0);
        self
    }

    pub fn with_daily_cap(mut self, daily_cap: usize) -> Self {
        self.daily_cap = daily_cap;
        self
    }
}
