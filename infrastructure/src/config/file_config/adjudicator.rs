//! Adjudicator configuration from TOML (`[adjudicator]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat-completions endpoint used to judge plan-exit calls.
///
/// # Example
///
/// ```toml
/// [adjudicator]
/// enabled = true
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_ms = 4000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAdjudicatorConfig {
    pub enabled: bool,
    pub model: String,
    pub endpoint: String,
    /// Direct API key. Prefer `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY")
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for FileAdjudicatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_ms: 4000,
        }
    }
}

impl FileAdjudicatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The direct key wins over the environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileAdjudicatorConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_direct_key_wins() {
        let config = FileAdjudicatorConfig {
            api_key: Some("sk-direct".to_string()),
            api_key_env: "TOOLGUARD_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-direct"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = FileAdjudicatorConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "TOOLGUARD_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn test_partial_toml() {
        let config: FileAdjudicatorConfig = toml::from_str("enabled = true").unwrap();
        assert!(config.enabled);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }
}
