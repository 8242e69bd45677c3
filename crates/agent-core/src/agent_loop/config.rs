//! Configuration for the agent step loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a new PROMPT interacts with a run that is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
    /// Runs take an exclusive slot and execute one after another.
    #[default]
    Serialize,
    /// Runs start immediately and share the session and the tab.
    Concurrent,
}

/// Configuration for one agent loop (resolve, load, capture, reason, act).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLoopConfig {
    /// Maximum iterations before forcing stop. Tab retries count too.
    /// Default: 5
    pub max_steps: u32,

    /// Pause after a step that asked to continue.
    /// Default: 3000
    pub step_pacing_ms: u64,

    /// Pause before retrying when no active tab is found.
    /// Default: 5000
    pub tab_retry_backoff_ms: u64,

    /// Upper bound on waiting for the tab to finish loading.
    /// Default: unbounded
    pub load_timeout_ms: Option<u64>,

    /// Default: serialize
    pub run_policy: RunPolicy,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            step_pacing_ms: 3_000,
            tab_retry_backoff_ms: 5_000,
            load_timeout_ms: None,
            run_policy: RunPolicy::Serialize,
        }
    }
}

impl AgentLoopConfig {
    /// Create a config with no pacing or backoff, for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            step_pacing_ms: 0,
            tab_retry_backoff_ms: 0,
            ..Self::default()
        }
    }

    /// Builder method to set max steps.
    pub fn with_max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder method to set the pacing delay.
    pub fn with_step_pacing_ms(mut self, ms: u64) -> Self {
        self.step_pacing_ms = ms;
        self
    }

    /// Builder method to set the tab retry backoff.
    pub fn with_tab_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.tab_retry_backoff_ms = ms;
        self
    }

    /// Builder method to bound the load wait.
    pub fn with_load_timeout_ms(mut self, ms: u64) -> Self {
        self.load_timeout_ms = Some(ms);
        self
    }

    /// Builder method to set the run policy.
    pub fn with_run_policy(mut self, policy: RunPolicy) -> Self {
        self.run_policy = policy;
        self
    }

    pub fn step_pacing(&self) -> Duration {
        Duration::from_millis(self.step_pacing_ms)
    }

    pub fn tab_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.tab_retry_backoff_ms)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}
