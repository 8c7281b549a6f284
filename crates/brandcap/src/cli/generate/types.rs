//! CLI enum types for the generate command. Each maps onto a core type.

use brandcap_core::{CaptionLength, CaptionStyle, CharacterLimit, ModelTier, TargetAudience};
use clap::ValueEnum;

/// How results are written to stdout (or `--output`).
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable captions with platform markers
    #[default]
    Text,
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

/// Supported LLM providers.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI API (or a compatible endpoint)
    Openai,
    /// Anthropic API
    Anthropic,
    /// Local Ollama instance
    Ollama,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 3] = [LlmProvider::Openai, LlmProvider::Anthropic, LlmProvider::Ollama];

    pub fn label(self) -> &'static str {
        match self {
            LlmProvider::Openai => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Ollama => "Ollama",
        }
    }

    /// `[llm.<section>]` holding the API key, if the provider uses one.
    pub fn key_section(self) -> Option<&'static str> {
        match self {
            LlmProvider::Openai => Some("openai"),
            LlmProvider::Anthropic => Some("anthropic"),
            LlmProvider::Ollama => None,
        }
    }

    pub fn env_var(self) -> Option<&'static str> {
        match self {
            LlmProvider::Openai => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.to_string() == name)
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Openai => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Cost tier.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum Tier {
    /// Cheaper, faster model (default)
    #[default]
    Standard,
    /// Higher-fidelity model
    Premium,
}

impl From<Tier> for ModelTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Standard => ModelTier::Standard,
            Tier::Premium => ModelTier::Premium,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Style {
    Professional,
    Casual,
    Inspirational,
    Educational,
    Promotional,
}

impl From<Style> for CaptionStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Professional => CaptionStyle::Professional,
            Style::Casual => CaptionStyle::Casual,
            Style::Inspirational => CaptionStyle::Inspirational,
            Style::Educational => CaptionStyle::Educational,
            Style::Promotional => CaptionStyle::Promotional,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Length {
    /// 3-4 sentences
    Short,
    /// 4-6 sentences
    Medium,
    /// 6-8 sentences
    Long,
}

impl From<Length> for CaptionLength {
    fn from(length: Length) -> Self {
        match length {
            Length::Short => CaptionLength::Short,
            Length::Medium => CaptionLength::Medium,
            Length::Long => CaptionLength::Long,
        }
    }
}

/// Character-limit preset.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Limit {
    None,
    /// 500 characters
    Facebook,
    /// 400 characters
    Instagram,
    /// 700 characters
    Linkedin,
    /// 280 characters
    Twitter,
    /// 280 characters, safe everywhere
    All,
}

impl From<Limit> for CharacterLimit {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::None => CharacterLimit::NoLimit,
            Limit::Facebook => CharacterLimit::Facebook,
            Limit::Instagram => CharacterLimit::Instagram,
            Limit::Linkedin => CharacterLimit::LinkedIn,
            Limit::Twitter => CharacterLimit::Twitter,
            Limit::All => CharacterLimit::AllPlatforms,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Audience {
    General,
    YoungAdults,
    Professionals,
    Families,
    Seniors,
    Local,
}

impl From<Audience> for TargetAudience {
    fn from(audience: Audience) -> Self {
        match audience {
            Audience::General => TargetAudience::General,
            Audience::YoungAdults => TargetAudience::YoungAdults,
            Audience::Professionals => TargetAudience::Professionals,
            Audience::Families => TargetAudience::Families,
            Audience::Seniors => TargetAudience::Seniors,
            Audience::Local => TargetAudience::LocalCommunity,
        }
    }
}
