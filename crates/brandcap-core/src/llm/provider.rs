//! LLM provider trait and request/response types.
//!
//! Defines the interface that all LLM providers implement, plus the
//! factory that creates the right provider from CLI flags and config.

use crate::config::LlmConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// System instruction for providers that accept one separately from the prompt.
///
/// Keeps replies to bare captions so no preamble is parsed as a variant.
pub const CAPTION_SYSTEM_PROMPT: &str = "You write social media captions for small businesses. \
Reply with the captions only, separated by blank lines, with no introduction or closing remarks.";

/// A caption generation request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Image to caption; `None` for text-only generation
    pub image: Option<ImageInput>,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, image: Option<ImageInput>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Cost tier: the cheaper model or the higher-fidelity one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Standard,
    Premium,
}

impl ModelTier {
    pub fn label(self) -> &'static str {
        match self {
            ModelTier::Standard => "Standard (faster, lower cost)",
            ModelTier::Premium => "Premium (higher quality)",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Standard => f.write_str("standard"),
            ModelTier::Premium => f.write_str("premium"),
        }
    }
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Model this provider sends requests to.
    fn model(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate text for the given request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Environment variable named by a `${VAR}` config value, or the provider default.
fn env_var_name(value: &str, fallback: &str) -> String {
    value
        .strip_prefix("${")
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(fallback)
        .to_string()
}

fn pick_model(tier: ModelTier, standard: &str, premium: &str, model_override: Option<&str>) -> String {
    model_override
        .map(String::from)
        .unwrap_or_else(|| match tier {
            ModelTier::Standard => standard.to_string(),
            ModelTier::Premium => premium.to_string(),
        })
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on provider name, config, tier, and optional model override.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("openai", "anthropic", "ollama")
    /// * `config` - The full LLM config section
    /// * `tier` - Selects the standard or premium model from the provider config
    /// * `model_override` - Optional model name that overrides the tier's model
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        tier: ModelTier,
        model_override: Option<&str>,
    ) -> Result<Box<dyn LlmProvider>, GenerationError> {
        match provider {
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or_else(|| GenerationError::MissingApiKey {
                        provider: "openai".to_string(),
                        env_var: env_var_name(&cfg.api_key, "OPENAI_API_KEY"),
                    })?;
                let model = pick_model(tier, &cfg.standard_model, &cfg.premium_model, model_override);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model,
                )))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or_else(|| GenerationError::MissingApiKey {
                        provider: "anthropic".to_string(),
                        env_var: env_var_name(&cfg.api_key, "ANTHROPIC_API_KEY"),
                    })?;
                let model = pick_model(tier, &cfg.standard_model, &cfg.premium_model, model_override);
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model,
                )))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let model = pick_model(tier, &cfg.standard_model, &cfg.premium_model, model_override);
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &model,
                )))
            }
            other => Err(GenerationError::UnknownProvider(other.to_string())),
        }
    }
}
