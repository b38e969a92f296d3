//! Search provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Search provider configuration (Tavily)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Tavily API key
    pub tavily_api_key: Option<String>,

    /// Base URL of the search API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum results returned per search
    #[serde(default = "default_max_results")]
    pub max_results: u8,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SearchConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.tavily_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate search configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("TAVILY_API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_results == 0 || self.max_results > 20 {
            return Err(ValidationError::InvalidMaxResults);
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            base_url: default_base_url(),
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> u8 {
    2
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_results, 2);
        assert_eq!(config.base_url, "https://api.tavily.com");
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = SearchConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("TAVILY_API_KEY"))
        ));
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let config = SearchConfig {
            tavily_api_key: Some("tvly-xxx".to_string()),
            max_results: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidMaxResults)
        ));
    }

    #[test]
    fn test_valid_config_passes() {
        let config = SearchConfig {
            tavily_api_key: Some("tvly-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
