//! Agent profiles

use serde::{Deserialize, Serialize};

use aida_tools::ToolKind;

use crate::prompt::{PROMPT_V01, PROMPT_V011};

/// A prompt, tool set and iteration cap bundled under a version name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentProfile {
    /// Bounded executor with three tools
    #[serde(rename = "v0.1")]
    V01,
    /// Looping agent that can also save content
    #[default]
    #[serde(rename = "v0.1.1")]
    V011,
}

impl AgentProfile {
    pub fn name(&self) -> &'static str {
        match self {
            AgentProfile::V01 => "v0.1",
            AgentProfile::V011 => "v0.1.1",
        }
    }

    pub fn from_str(s: &str) -> Option<AgentProfile> {
        match s.trim().trim_start_matches(['v', 'V']) {
            "0.1" => Some(AgentProfile::V01),
            "0.1.1" => Some(AgentProfile::V011),
            _ => None,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentProfile::V01 => PROMPT_V01,
            AgentProfile::V011 => PROMPT_V011,
        }
    }

    pub fn tools(&self) -> Vec<ToolKind> {
        match self {
            AgentProfile::V01 => vec![
                ToolKind::DocumentRetrieval,
                ToolKind::WebSearch,
                ToolKind::WebsiteScraper,
            ],
            AgentProfile::V011 => ToolKind::all(),
        }
    }

    pub fn default_max_iterations(&self) -> usize {
        match self {
            AgentProfile::V01 => 3,
            AgentProfile::V011 => 10,
        }
    }
}

impl std::fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(AgentProfile::from_str("v0.1"), Some(AgentProfile::V01));
        assert_eq!(AgentProfile::from_str("0.1.1"), Some(AgentProfile::V011));
        assert_eq!(AgentProfile::from_str("v2"), None);
    }

    #[test]
    fn test_v01_has_no_save_content() {
        assert!(!AgentProfile::V01.tools().contains(&ToolKind::SaveContent));
        assert!(AgentProfile::V011.tools().contains(&ToolKind::SaveContent));
        assert!(AgentProfile::V011.system_prompt().contains("WebsiteScraper"));
    }
}
