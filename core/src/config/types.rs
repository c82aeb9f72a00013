//! Configuration types for VO service access

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

fn default_registry_base_url() -> String {
    crate::registry::STSCI_REGISTRY_BASEURL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("voquest/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings shared by every service client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoConfig {
    /// Base URL of the resource registry
    #[serde(default = "default_registry_base_url")]
    pub registry_base_url: String,

    /// HTTP timeout applied to every request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Row cap forwarded to services that honor one, such as TAP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u64>,
}

impl Default for VoConfig {
    fn default() -> Self {
        Self {
            registry_base_url: default_registry_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_records: None,
        }
    }
}

impl VoConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry base URL
    pub fn with_registry_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.registry_base_url = url.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent<S: Into<String>>(mut self, agent: S) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the row cap
    pub fn with_max_records(mut self, maxrec: u64) -> Self {
        self.max_records = Some(maxrec);
        self
    }

    /// Check the configuration for values no client could work with
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.registry_base_url).map_err(|_| ConfigError::InvalidValue {
            field: "registry_base_url".to_string(),
            value: self.registry_base_url.clone(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                field: "registry_base_url".to_string(),
                value: format!("unsupported scheme: {}", url.scheme()),
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_agent".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.registry_base_url.starts_with("http://vao.stsci.edu/"));
        assert!(config.user_agent.starts_with("voquest/"));
        assert!(config.max_records.is_none());
    }

    #[test]
    fn test_builders() {
        let config = VoConfig::new()
            .with_registry_base_url("https://registry.example.org/")
            .with_timeout_secs(5)
            .with_user_agent("probe/1.0")
            .with_max_records(1000);
        assert!(config.validate().is_ok());
        assert_eq!(config.registry_base_url, "https://registry.example.org/");
        assert_eq!(config.max_records, Some(1000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(VoConfig::new()
            .with_registry_base_url("not a url")
            .validate()
            .is_err());
        assert!(VoConfig::new()
            .with_registry_base_url("ftp://example.org/")
            .validate()
            .is_err());
        assert!(VoConfig::new().with_timeout_secs(0).validate().is_err());
        assert!(VoConfig::new().with_user_agent("  ").validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: VoConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, VoConfig::default());

        let config: VoConfig =
            serde_json::from_str(r#"{"timeout_secs": 10, "max_records": 50}"#).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_records, Some(50));
        assert_eq!(config.registry_base_url, VoConfig::default().registry_base_url);
    }
}
