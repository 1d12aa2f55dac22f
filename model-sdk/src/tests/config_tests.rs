//! Tests for configuration loading

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::{
        ConfigProvider, EnvConfigProvider, GeminiConfig, MemoryConfigProvider, ServiceConfig,
        DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    };
    use crate::error::ServiceError;
    use crate::resilience::GuardConfig;

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::from_provider(&MemoryConfigProvider::new()).unwrap();

        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.guard_config(), GuardConfig::default());
    }

    #[test]
    fn test_from_memory_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("gemini_api_key", " AIza-test-key ");
        provider.set("gemini_model", "gemini-1.5-flash");
        provider.set("gemini_base_url", "http://localhost:8089/v1beta");
        provider.set("gemini_timeout_seconds", "10");
        provider.set("gemini_max_retries", "2");
        provider.set("gemini_backoff_base_ms", "250");

        let config = GeminiConfig::from_provider(&provider).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("AIza-test-key"));
        assert!(config.has_credential());
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(
            config.guard_config(),
            GuardConfig {
                attempt_timeout: Duration::from_secs(10),
                max_retries: 2,
                backoff_base: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("gemini_timeout_seconds", "0");
        provider.set("gemini_max_retries", "50");
        provider.set("gemini_backoff_base_ms", "-5");

        let config = GeminiConfig::from_provider(&provider).unwrap();

        assert_eq!(config.timeout_seconds, 1);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.backoff_base_ms, 0);
    }

    #[test]
    fn test_unparseable_numbers_use_defaults() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("gemini_timeout_seconds", "soon");

        let config = GeminiConfig::from_provider(&provider).unwrap();
        assert_eq!(config.timeout_seconds, 25);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("gemini_base_url", "not a url");

        let err = GeminiConfig::from_provider(&provider).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_validate_requires_model() {
        let config = GeminiConfig {
            model: " ".to_string(),
            ..GeminiConfig::default()
        };

        assert!(config.validate().is_err());
        assert_eq!(config.service_name(), "gemini");
    }

    #[test]
    fn test_env_config_provider() {
        std::env::set_var("MODEL_SDK_TEST_GEMINI_MODEL", "gemini-env-model");
        std::env::set_var("MODEL_SDK_TEST_GEMINI_MAX_RETRIES", "3");

        let provider = EnvConfigProvider::new().with_prefix("MODEL_SDK_TEST");
        assert_eq!(provider.get_string("gemini_model").unwrap(), "gemini-env-model");
        assert!(provider.get_string("gemini_api_key").is_err());

        let config = GeminiConfig::from_provider(&provider).unwrap();
        assert_eq!(config.model, "gemini-env-model");
        assert_eq!(config.max_retries, 3);
        assert!(!config.has_credential());

        std::env::remove_var("MODEL_SDK_TEST_GEMINI_MODEL");
        std::env::remove_var("MODEL_SDK_TEST_GEMINI_MAX_RETRIES");
    }
}
