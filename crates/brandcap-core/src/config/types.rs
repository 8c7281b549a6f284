//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::prompt::{CaptionLength, CaptionStyle, CharacterLimit};

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default directory for `--save-dir` exports when none is given
    pub export_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("~/brandcap-exports"),
        }
    }
}

/// Website analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Whether to analyze the website at all when a URL is given
    pub enabled: bool,

    /// Per-page request timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum number of secondary pages to fetch (about, services, ...)
    pub max_pages: usize,

    /// Number of `<a href>` links examined on the main page
    pub max_links_scanned: usize,

    /// Concurrent secondary-page fetches
    pub concurrency: usize,

    /// Maximum number of candidate images returned
    pub max_images: usize,

    /// How long an analysis stays cached, in seconds
    pub cache_ttl_secs: u64,

    /// Maximum cached analyses before the oldest is evicted
    pub cache_max_entries: usize,

    /// How long a failed analysis is remembered, in seconds. 0 disables it
    pub failure_ttl_secs: u64,

    /// Browser user-agent strings tried in order when a site answers 403
    pub user_agents: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 10_000,
            max_pages: 10,
            max_links_scanned: 150,
            concurrency: 4,
            max_images: 5,
            cache_ttl_secs: 300,
            cache_max_entries: 32,
            failure_ttl_secs: 120,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input image size in megabytes
    pub max_file_size_mb: u64,

    /// Longest edge of the image sent to the model; larger images are downscaled
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// LLM call timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 2048,
            decode_timeout_ms: 5000,
            llm_timeout_ms: 60_000,
        }
    }
}

/// Caption generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Default caption style
    pub style: CaptionStyle,

    /// Default caption length
    pub length: CaptionLength,

    /// Default platform character limit
    pub character_limit: CharacterLimit,

    /// Include a call-to-action by default
    pub include_cta: bool,

    /// Maximum tokens requested from the model
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Max retry attempts for transient API failures
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,

    /// Generations attempted when captions repeat ones already used this session
    pub regenerate_attempts: u32,

    /// Word-overlap ratio at which two captions count as duplicates
    pub duplicate_threshold: f32,

    /// Concurrent generations in batch mode
    pub parallel: usize,

    /// Maximum images processed in one batch
    pub batch_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            style: CaptionStyle::Professional,
            length: CaptionLength::Medium,
            character_limit: CharacterLimit::NoLimit,
            include_cta: true,
            max_tokens: 500,
            temperature: 0.7,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            regenerate_attempts: 3,
            duplicate_threshold: 0.8,
            parallel: 2,
            batch_limit: 10,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when none is given on the command line
    pub provider: String,

    /// OpenAI (or OpenAI-compatible) configuration
    pub openai: Option<OpenAiConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai: Some(OpenAiConfig::default()),
            anthropic: None,
            ollama: None,
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat Completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Cheaper model used for the standard tier
    pub standard_model: String,

    /// Higher-fidelity model used for the premium tier
    pub premium_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            standard_model: "gpt-4o-mini".to_string(),
            premium_model: "gpt-4o".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// Messages endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Standard tier model
    pub standard_model: String,

    /// Premium tier model
    pub premium_model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            standard_model: "claude-3-5-haiku-latest".to_string(),
            premium_model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Standard tier model
    pub standard_model: String,

    /// Premium tier model
    pub premium_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            standard_model: "llama3.2-vision".to_string(),
            premium_model: "llama3.2-vision:90b".to_string(),
        }
    }
}
