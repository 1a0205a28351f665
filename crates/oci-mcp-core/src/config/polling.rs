//! Polling configuration for state-changing operations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff settings used while waiting for a resource to reach a target state.
///
/// The first check happens after `initial_interval_ms`; each further wait is
/// multiplied by `multiplier` and capped at `max_interval_ms`. The total wait
/// never exceeds `timeout_secs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollingConfig {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound on the total time spent polling.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollingConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_initial_interval_ms() -> u64 {
    5_000
}

fn default_max_interval_ms() -> u64 {
    15_000
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_timeout_secs() -> u64 {
    60
}
