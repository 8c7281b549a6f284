//! Configuration management for brandcap.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for brandcap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Website analysis settings
    pub scrape: ScrapeConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Caption generation settings
    pub generation: GenerationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.brandcap.brandcap/config.toml
    /// - Linux: ~/.config/brandcap/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\brandcap\config\config.toml
    ///
    /// Falls back to ~/.brandcap/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "brandcap", "brandcap")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".brandcap").join("config.toml")
            })
    }

    /// Get the resolved export directory (with ~ expansion).
    pub fn export_dir(&self) -> PathBuf {
        let path_str = self.general.export_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{CaptionLength, CaptionStyle};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scrape.max_pages, 10);
        assert_eq!(config.scrape.cache_ttl_secs, 300);
        assert_eq!(config.generation.max_tokens, 500);
        assert_eq!(config.generation.batch_limit, 10);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_default_tier_models() {
        let openai = OpenAiConfig::default();
        assert_eq!(openai.standard_model, "gpt-4o-mini");
        assert_eq!(openai.premium_model, "gpt-4o");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[scrape]"));
        assert!(toml.contains("[generation]"));
        assert!(toml.contains("[llm.openai]"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [generation]
            style = "casual"
            length = "long"

            [scrape]
            max_pages = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.style, CaptionStyle::Casual);
        assert_eq!(config.generation.length, CaptionLength::Long);
        assert_eq!(config.scrape.max_pages, 3);
        assert_eq!(config.scrape.timeout_ms, 10_000);
        assert!(config.generation.include_cta);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let err = Config::from_toml_str("[scrape]\nmax_pages = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_pages"));
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
