//! Configuration management for the model invoker
//!
//! This module provides utilities for loading and validating configuration
//! for the generative model client, with support for environment variables.
//! Configuration is always loaded into an explicit value and handed to the
//! invoker at construction; nothing here is process-global.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::resilience::GuardConfig;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for every contract prompt
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a non-blank string, treating unset and whitespace-only alike
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl<T: ConfigProvider> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "GEMINI")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => {
                ServiceError::configuration(format!("Environment variable is not valid unicode: {}", env_key))
            }
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Configuration for the Gemini generative API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. `None` is a supported state: the invoker answers with the
    /// credential fallback instead of calling out.
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Base URL (can be changed for proxies and tests)
    pub base_url: String,

    /// Per-attempt time budget in seconds
    pub timeout_seconds: u64,

    /// Retries after a timed-out attempt
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each later one
    pub backoff_base_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_seconds: 25,
            max_retries: 1,
            backoff_base_ms: 1000,
        }
    }
}

impl GeminiConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ConfigProviderExt>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            api_key: provider.get_non_empty("gemini_api_key"),
            model: provider.get_string_or("gemini_model", &defaults.model),
            base_url: provider.get_string_or("gemini_base_url", &defaults.base_url),
            timeout_seconds: provider.get_int_or("gemini_timeout_seconds", defaults.timeout_seconds as i64).max(1)
                as u64,
            max_retries: provider.get_int_or("gemini_max_retries", defaults.max_retries as i64).clamp(0, 5) as u32,
            backoff_base_ms: provider.get_int_or("gemini_backoff_base_ms", defaults.backoff_base_ms as i64).max(0)
                as u64,
        };

        config.validate()?;
        Ok(config)
    }

    /// Whether a credential is present
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }

    /// Guard settings derived from this configuration
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            attempt_timeout: Duration::from_secs(self.timeout_seconds),
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }
}

impl ServiceConfig for GeminiConfig {
    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("Gemini model name is required"));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| ServiceError::configuration(format!("Invalid Gemini base URL {}: {}", self.base_url, e)))?;

        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration("Gemini timeout must be at least one second"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", "123");

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_int("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new().with_prefix("TEST").with_namespace("CONFIG");

        assert_eq!(provider.format_key("api_key"), "TEST_CONFIG_API_KEY");
        assert_eq!(provider.format_key("base-url"), "TEST_CONFIG_BASE_URL");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("gemini_api_key", "   ");

        let config = GeminiConfig::from_provider(&provider).unwrap();
        assert!(config.api_key.is_none());
        assert!(!config.has_credential());
    }
}
