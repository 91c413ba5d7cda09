//! Configuration for the Aparavi Data Suite connection.
//!
//! Environment variables (loaded through `dotenvy` at startup):
//! - `APARAVI_HOST` (default: localhost)
//! - `APARAVI_PORT` (default: 80)
//! - `APARAVI_USERNAME` / `APARAVI_PASSWORD` (required)
//! - `APARAVI_API_VERSION` (default: v3)
//! - `APARAVI_TIMEOUT` (seconds, default: 1800)
//! - `APARAVI_MAX_RETRIES` (default: 3)
//! - `APARAVI_CLIENT_OBJECT_ID` (optional, auto-discovered when unset)
//! - `CACHE_ENABLED` (default: true)
//! - `CACHE_TTL` (seconds, default: 300)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Default retry budget for the query endpoint.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Connection settings for one Aparavi Data Suite instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AparaviConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Username for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
    /// API version segment of the base URL.
    pub api_version: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of retries for the query endpoint.
    pub max_retries: u32,
    /// Tenant (client object) id for tagging operations. Auto-discovered
    /// when unset.
    pub client_object_id: Option<String>,
    /// Whether query results are cached.
    pub cache_enabled: bool,
    /// Cache TTL in seconds.
    pub cache_ttl_seconds: u64,
}

impl Default for AparaviConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 80,
            username: String::new(),
            password: String::new(),
            api_version: "v3".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            client_object_id: None,
            cache_enabled: true,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl AparaviConfig {
    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("APARAVI_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("APARAVI_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(80),
            username: std::env::var("APARAVI_USERNAME").unwrap_or_default(),
            password: std::env::var("APARAVI_PASSWORD").unwrap_or_default(),
            api_version: std::env::var("APARAVI_API_VERSION").unwrap_or_else(|_| "v3".to_string()),
            timeout_seconds: std::env::var("APARAVI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: std::env::var("APARAVI_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            client_object_id: std::env::var("APARAVI_CLIENT_OBJECT_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            cache_enabled: std::env::var("CACHE_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            cache_ttl_seconds: std::env::var("CACHE_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Base URL of the Data Suite API.
    pub fn base_url(&self) -> String {
        format!(
            "http://{}:{}/server/api/{}",
            self.host, self.port, self.api_version
        )
    }

    /// The database query endpoint.
    pub fn query_endpoint(&self) -> String {
        format!("{}/database/query", self.base_url())
    }

    /// The tag-definition management endpoint.
    pub fn tag_definitions_endpoint(&self) -> String {
        format!("{}/tagDefinitions", self.base_url())
    }

    /// The file-tagging endpoint.
    pub fn tags_endpoint(&self) -> String {
        format!("{}/tags", self.base_url())
    }

    /// Reject configurations that cannot possibly work.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Config("Aparavi username is required".to_string()));
        }
        if self.password.trim().is_empty() {
            return Err(Error::Config("Aparavi password is required".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("Aparavi port must be non-zero".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("Aparavi timeout must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AparaviConfig {
        AparaviConfig {
            username: "root".to_string(),
            password: "root".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AparaviConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 80);
        assert_eq!(config.api_version, "v3");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.client_object_id.is_none());
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl_seconds, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_base_url() {
        let config = AparaviConfig {
            host: "catalog.example.com".to_string(),
            port: 8080,
            ..valid_config()
        };
        assert_eq!(
            config.base_url(),
            "http://catalog.example.com:8080/server/api/v3"
        );
        assert_eq!(
            config.query_endpoint(),
            "http://catalog.example.com:8080/server/api/v3/database/query"
        );
        assert_eq!(
            config.tag_definitions_endpoint(),
            "http://catalog.example.com:8080/server/api/v3/tagDefinitions"
        );
        assert_eq!(
            config.tags_endpoint(),
            "http://catalog.example.com:8080/server/api/v3/tags"
        );
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_username() {
        let config = AparaviConfig {
            username: "  ".to_string(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_validate_rejects_missing_password() {
        let config = AparaviConfig {
            password: String::new(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AparaviConfig {
            timeout_seconds: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
