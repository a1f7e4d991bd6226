//! Client configuration.
//!
//! Loaded from environment variables with fallback to the development
//! defaults (mock backend, demo user `u1`).

use serde::{Deserialize, Serialize};
use shared::User;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_USER_ID: &str = "u1";
pub const DEFAULT_USER_NAME: &str = "Pavel Arbes";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Answer every call from the in-memory store instead of the network
    pub use_mock: bool,

    /// Base URL of the real backend, without trailing slash
    pub base_url: String,

    /// Sent as `x-user-id` and used for ownership checks
    pub current_user_id: String,

    pub current_user_name: String,

    /// Simulated latency of each mock call
    pub mock_latency_ms: u64,

    /// Timeout of each HTTP request
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            use_mock: true,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            current_user_id: DEFAULT_USER_ID.to_string(),
            current_user_name: DEFAULT_USER_NAME.to_string(),
            mock_latency_ms: 200,
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup, defaults filling the gaps
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            use_mock: parse_or(&lookup, "SHOPPING_LIST_USE_MOCK", defaults.use_mock)?,
            base_url: lookup("SHOPPING_LIST_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            current_user_id: lookup("SHOPPING_LIST_USER_ID").unwrap_or(defaults.current_user_id),
            current_user_name: lookup("SHOPPING_LIST_USER_NAME")
                .unwrap_or(defaults.current_user_name),
            mock_latency_ms: parse_or(
                &lookup,
                "SHOPPING_LIST_MOCK_LATENCY_MS",
                defaults.mock_latency_ms,
            )?,
            request_timeout_secs: parse_or(
                &lookup,
                "SHOPPING_LIST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    pub fn current_user(&self) -> User {
        User {
            id: self.current_user_id.clone(),
            name: self.current_user_name.clone(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert!(config.use_mock);
        assert_eq!(config.current_user().id, "u1");
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("SHOPPING_LIST_USE_MOCK", "false"),
            ("SHOPPING_LIST_API_URL", "http://api.example.com/"),
            ("SHOPPING_LIST_USER_ID", "u2"),
            ("SHOPPING_LIST_USER_NAME", "Jan Novak"),
            ("SHOPPING_LIST_MOCK_LATENCY_MS", "0"),
            ("SHOPPING_LIST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert!(!config.use_mock);
        assert_eq!(config.base_url, "http://api.example.com");
        assert_eq!(config.current_user_id, "u2");
        assert_eq!(config.current_user_name, "Jan Novak");
        assert_eq!(config.mock_latency_ms, 0);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_value_names_the_key() {
        let result = ApiConfig::from_lookup(lookup_from(&[("SHOPPING_LIST_USE_MOCK", "maybe")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue("SHOPPING_LIST_USE_MOCK".to_string()))
        );
    }
}
