//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::llm::KNOWN_PROVIDERS;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let positive_checks: [(&str, bool); 10] = [
            ("scrape.timeout_ms", self.scrape.timeout_ms > 0),
            ("scrape.max_pages", self.scrape.max_pages > 0),
            ("scrape.concurrency", self.scrape.concurrency > 0),
            ("scrape.cache_max_entries", self.scrape.cache_max_entries > 0),
            ("limits.max_file_size_mb", self.limits.max_file_size_mb > 0),
            ("limits.max_image_dimension", self.limits.max_image_dimension > 0),
            ("limits.decode_timeout_ms", self.limits.decode_timeout_ms > 0),
            ("limits.llm_timeout_ms", self.limits.llm_timeout_ms > 0),
            ("generation.max_tokens", self.generation.max_tokens > 0),
            ("generation.parallel", self.generation.parallel > 0),
        ];
        for (field, ok) in positive_checks {
            if !ok {
                return Err(ConfigError::ValidationError(format!("{field} must be > 0")));
            }
        }
        if self.generation.batch_limit == 0 {
            return Err(ConfigError::ValidationError(
                "generation.batch_limit must be >= 1".into(),
            ));
        }
        if self.generation.regenerate_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "generation.regenerate_attempts must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.duplicate_threshold) {
            return Err(ConfigError::ValidationError(
                "generation.duplicate_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.scrape.user_agents.is_empty() {
            return Err(ConfigError::ValidationError(
                "scrape.user_agents must list at least one user agent".into(),
            ));
        }
        if !KNOWN_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be one of {}, got '{}'",
                KNOWN_PROVIDERS.join(", "),
                self.llm.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.llm_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_batch_limit() {
        let mut config = Config::default();
        config.generation.batch_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_limit"));
    }

    #[test]
    fn test_validate_rejects_invalid_duplicate_threshold() {
        let mut config = Config::default();
        config.generation.duplicate_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate_threshold"));

        config.generation.duplicate_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "hal9000".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hal9000"));
    }

    #[test]
    fn test_validate_rejects_empty_user_agents() {
        let mut config = Config::default();
        config.scrape.user_agents.clear();
        assert!(config.validate().is_err());
    }
}
