//! Agent configuration

use serde::{Deserialize, Serialize};
use std::env;

use aida_core::{Error, Result};

use crate::profile::AgentProfile;

/// What to do when a turn reaches the iteration cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationLimitPolicy {
    /// Return the last AI text (or a stop notice) as the answer
    #[default]
    BestEffort,
    /// Fail the turn with `Error::IterationLimit`
    Fail,
}

impl IterationLimitPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Some(IterationLimitPolicy::BestEffort),
            "fail" => Some(IterationLimitPolicy::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub profile: AgentProfile,
    /// Maximum LLM invocations per turn
    pub max_iterations: usize,
    pub on_iteration_limit: IterationLimitPolicy,
}

impl AgentConfig {
    pub fn for_profile(profile: AgentProfile) -> Self {
        Self {
            profile,
            max_iterations: profile.default_max_iterations(),
            on_iteration_limit: IterationLimitPolicy::default(),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let profile = match get("AIDA_PROFILE") {
            Some(name) => AgentProfile::from_str(&name).ok_or_else(|| {
                Error::Configuration(format!(
                    "Unknown AIDA_PROFILE '{}' (expected v0.1 or v0.1.1)",
                    name
                ))
            })?,
            None => AgentProfile::default(),
        };
        let mut config = Self::for_profile(profile);

        if let Some(raw) = get("AIDA_MAX_ITERATIONS") {
            config.max_iterations = raw
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or_else(|| {
                    Error::Configuration(format!("Invalid AIDA_MAX_ITERATIONS '{}'", raw))
                })?;
        }
        if let Some(raw) = get("AIDA_ON_ITERATION_LIMIT") {
            config.on_iteration_limit = IterationLimitPolicy::from_str(&raw).ok_or_else(|| {
                Error::Configuration(format!(
                    "Invalid AIDA_ON_ITERATION_LIMIT '{}' (expected best_effort or fail)",
                    raw
                ))
            })?;
        }
        Ok(config)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::for_profile(AgentProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::from_lookup(|_| None).unwrap();
        assert_yaml_snapshot!(config, @r###"
        profile: v0.1.1
        max_iterations: 10
        on_iteration_limit: best_effort
        "###);
    }

    #[test]
    fn test_profile_sets_cap() {
        let config = AgentConfig::from_lookup(|k| (k == "AIDA_PROFILE").then(|| "v0.1".to_string())).unwrap();
        assert_eq!(config.profile, AgentProfile::V01);
        assert_eq!(config.max_iterations, 3);
    }

    #[test]
    fn test_overrides_and_errors() {
        let config = AgentConfig::from_lookup(|k| match k {
            "AIDA_MAX_ITERATIONS" => Some("5".to_string()),
            "AIDA_ON_ITERATION_LIMIT" => Some("fail".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Fail);

        assert!(AgentConfig::from_lookup(|k| (k == "AIDA_MAX_ITERATIONS").then(|| "0".to_string())).is_err());
        assert!(AgentConfig::from_lookup(|k| (k == "AIDA_PROFILE").then(|| "v9".to_string())).is_err());
    }
}
