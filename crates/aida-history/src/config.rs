//! Locations of the session database and chat exports

use std::env;
use std::path::PathBuf;

/// Where sessions live on disk
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    /// SQLite database holding every session
    pub db_path: PathBuf,
    /// Directory for `/save` and `/load` exports
    pub chats_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".aida").join("history.db"),
            chats_dir: PathBuf::from("chats"),
        }
    }
}

impl HistoryConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let data_dir = get("AIDA_DATA_DIR").unwrap_or_else(|| ".aida".to_string());

        Self {
            db_path: PathBuf::from(data_dir).join("history.db"),
            chats_dir: PathBuf::from(get("AIDA_CHATS_DIR").unwrap_or_else(|| "chats".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::from_lookup(|_| None);
        assert_eq!(config, HistoryConfig::default());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("AIDA_DATA_DIR", "/var/aida"), ("AIDA_CHATS_DIR", "saved")]);
        let config = HistoryConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.db_path, PathBuf::from("/var/aida/history.db"));
        assert_eq!(config.chats_dir, PathBuf::from("saved"));
    }
}
