//! Bounded backoff polling for resources in transition.

use crate::error::ToolError;
use oci_mcp_core::PollingConfig;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Backoff schedule for waiting on a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Total time budget. The last wait is shortened so the sum of all waits
    /// never exceeds it.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            initial_interval: config.initial_interval(),
            max_interval: config.max_interval(),
            multiplier: config.multiplier,
            timeout: config.timeout(),
        }
    }
}

impl PollPolicy {
    /// Successive waits before each check.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut elapsed = Duration::ZERO;
        let mut next = self.initial_interval.min(self.max_interval);

        while elapsed < self.timeout && !next.is_zero() {
            let delay = next.min(self.timeout - elapsed);
            delays.push(delay);
            elapsed += delay;
            next = next.mul_f64(self.multiplier.max(1.0)).min(self.max_interval);
        }
        delays
    }
}

/// Result of polling a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The resource reached the wanted state.
    Reached(Value),
    /// The time budget ran out; holds the last observed resource.
    InProgress(Value),
}

/// Re-fetch a resource until `done` accepts it or the policy's budget is spent.
pub async fn poll_until<F, Fut, D>(
    policy: &PollPolicy,
    mut fetch: F,
    done: D,
) -> Result<PollOutcome, ToolError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, ToolError>>,
    D: Fn(&Value) -> bool,
{
    let mut last = None;
    for (attempt, delay) in policy.delays().into_iter().enumerate() {
        tokio::time::sleep(delay).await;
        let current = fetch().await?;
        if done(&current) {
            tracing::debug!(attempt, "Resource reached target state");
            return Ok(PollOutcome::Reached(current));
        }
        last = Some(current);
    }

    let last = match last {
        Some(value) => value,
        None => fetch().await?,
    };
    if done(&last) {
        return Ok(PollOutcome::Reached(last));
    }
    Ok(PollOutcome::InProgress(last))
}
