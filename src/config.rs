//! Application configuration, loaded from YAML and adjusted from the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agent_core::{AgentLoopConfig, ReasoningConfig};
use message_router::RouterConfig;
use tabpilot_voice::VoiceConfig;

pub const ENV_REASONING_URL: &str = "TABPILOT_REASONING_URL";
pub const ENV_MAX_STEPS: &str = "TABPILOT_MAX_STEPS";
pub const ENV_STEP_PACING_MS: &str = "TABPILOT_STEP_PACING_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentLoopConfig,
    pub reasoning: ReasoningConfig,
    pub voice: VoiceConfig,
    pub router: RouterConfig,
}

impl Config {
    /// Apply `TABPILOT_*` overrides. `lookup` is usually `std::env::var`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_REASONING_URL).filter(|url| !url.trim().is_empty()) {
            self.reasoning.endpoint = url;
        }
        if let Some(raw) = lookup(ENV_MAX_STEPS) {
            self.agent.max_steps = parse_number(ENV_MAX_STEPS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STEP_PACING_MS) {
            self.agent.step_pacing_ms = parse_number(ENV_STEP_PACING_MS, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::Invalid("agent.max_steps must be at least 1".into()));
        }
        if self.router.bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "router.bus_capacity must be at least 1".into(),
            ));
        }
        if !self.reasoning.mock && self.reasoning.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "reasoning.endpoint is required unless reasoning.mock is set".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::RunPolicy;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str(
            "agent:\n  max_steps: 8\n  run_policy: concurrent\nreasoning:\n  mock: true\n",
        )
        .unwrap();
        assert_eq!(config.agent.max_steps, 8);
        assert_eq!(config.agent.step_pacing_ms, 3_000);
        assert_eq!(config.agent.run_policy, RunPolicy::Concurrent);
        assert!(config.reasoning.mock);
        assert_eq!(config.router.origin, "tabpilot");
        assert_eq!(config.voice.speech_timeout_ms, None);
    }

    #[test]
    fn env_overrides_apply_after_file() {
        let env: HashMap<&str, &str> = [
            (ENV_REASONING_URL, "http://reasoner.local/prompt"),
            (ENV_MAX_STEPS, "3"),
            (ENV_STEP_PACING_MS, " 250 "),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.reasoning.endpoint, "http://reasoner.local/prompt");
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.agent.step_pacing_ms, 250);
    }

    #[test]
    fn bad_number_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| (key == ENV_MAX_STEPS).then(|| "many".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_MAX_STEPS.to_string(),
                value: "many".to_string()
            }
        );
    }

    #[test]
    fn zero_steps_fail_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.agent.max_steps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
