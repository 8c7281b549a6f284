//! LLM integration for caption generation.
//!
//! Provides a provider abstraction over the supported vision-capable
//! backends (OpenAI, Anthropic, Ollama) and the generator that turns a
//! prompt and optional image into a set of caption variants.

pub(crate) mod anthropic;
pub(crate) mod generator;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;
pub mod retry;

pub use generator::{CaptionGenerator, GenerateOptions, Generation};
pub use provider::{
    resolve_env_var, ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse,
    ModelTier,
};

/// Provider names accepted in `[llm].provider` and `--provider`.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "anthropic", "ollama"];
