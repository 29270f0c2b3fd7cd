//! Tool configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Enables the Tavily search and extract backends
    pub tavily_api_key: Option<String>,
    /// Where SaveContent writes files
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
    /// Upper bound on the WebSearch context, in characters
    pub max_search_chars: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            output_dir: PathBuf::from("outputs"),
            timeout_secs: 30,
            max_search_chars: 4000,
        }
    }
}

impl ToolsConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            tavily_api_key: get("TAVILY_API_KEY"),
            output_dir: get("AIDA_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            ..defaults
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
