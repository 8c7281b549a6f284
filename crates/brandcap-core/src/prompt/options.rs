//! User-facing caption options and the business context they apply to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tone of voice for the captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionStyle {
    #[default]
    Professional,
    Casual,
    Inspirational,
    Educational,
    Promotional,
}

impl CaptionStyle {
    pub const ALL: [CaptionStyle; 5] = [
        CaptionStyle::Professional,
        CaptionStyle::Casual,
        CaptionStyle::Inspirational,
        CaptionStyle::Educational,
        CaptionStyle::Promotional,
    ];

    /// The phrase inserted into the prompt's "Style:" requirement.
    pub fn instruction(self) -> &'static str {
        match self {
            CaptionStyle::Professional => "maintaining a professional, trustworthy tone",
            CaptionStyle::Casual => "using a warm, conversational, and approachable tone",
            CaptionStyle::Inspirational => {
                "focusing on motivation, dreams, and positive transformation"
            }
            CaptionStyle::Educational => "providing valuable insights and information",
            CaptionStyle::Promotional => "highlighting benefits and encouraging action",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptionStyle::Professional => "Professional",
            CaptionStyle::Casual => "Casual & Friendly",
            CaptionStyle::Inspirational => "Inspirational",
            CaptionStyle::Educational => "Educational",
            CaptionStyle::Promotional => "Promotional",
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How long each caption should be, in sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl CaptionLength {
    pub const ALL: [CaptionLength; 3] =
        [CaptionLength::Short, CaptionLength::Medium, CaptionLength::Long];

    /// Sentence count as phrased in the prompt.
    pub fn sentences(self) -> &'static str {
        match self {
            CaptionLength::Short => "3-4 sentences",
            CaptionLength::Medium => "4-6 sentences",
            CaptionLength::Long => "6 or more sentences",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptionLength::Short => "Short (3-4 sentences)",
            CaptionLength::Medium => "Medium (4-6 sentences)",
            CaptionLength::Long => "Long (6+ sentences)",
        }
    }
}

impl fmt::Display for CaptionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Platform character budget the captions should fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CharacterLimit {
    #[default]
    #[serde(rename = "no-limit")]
    NoLimit,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "all-platforms")]
    AllPlatforms,
}

impl CharacterLimit {
    pub const ALL: [CharacterLimit; 6] = [
        CharacterLimit::NoLimit,
        CharacterLimit::Facebook,
        CharacterLimit::Instagram,
        CharacterLimit::LinkedIn,
        CharacterLimit::Twitter,
        CharacterLimit::AllPlatforms,
    ];

    /// Maximum characters, or `None` for no limit.
    pub fn max_chars(self) -> Option<usize> {
        match self {
            CharacterLimit::NoLimit => None,
            CharacterLimit::Facebook => Some(500),
            CharacterLimit::Instagram => Some(400),
            CharacterLimit::LinkedIn => Some(700),
            CharacterLimit::Twitter | CharacterLimit::AllPlatforms => Some(280),
        }
    }

    /// The requirement line inserted into the prompt, without its bullet.
    pub fn instruction(self) -> String {
        let target = match self {
            CharacterLimit::NoLimit => return "Ready for Instagram, Facebook, or LinkedIn".into(),
            CharacterLimit::Facebook => "Facebook optimization",
            CharacterLimit::Instagram => "Instagram optimization",
            CharacterLimit::LinkedIn => "LinkedIn optimization",
            CharacterLimit::Twitter => "Twitter/X compatibility",
            CharacterLimit::AllPlatforms => "universal platform compatibility",
        };
        // max_chars is Some for every variant past the early return
        let limit = self.max_chars().unwrap_or_default();
        format!("IMPORTANT: Each caption must be {limit} characters or less for {target}")
    }

    pub fn label(self) -> &'static str {
        match self {
            CharacterLimit::NoLimit => "No limit",
            CharacterLimit::Facebook => "Facebook (≤500 chars)",
            CharacterLimit::Instagram => "Instagram (≤400 chars)",
            CharacterLimit::LinkedIn => "LinkedIn (≤700 chars)",
            CharacterLimit::Twitter => "Twitter/X (≤280 chars)",
            CharacterLimit::AllPlatforms => "All platforms (≤280 chars)",
        }
    }
}

impl fmt::Display for CharacterLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audience the captions should speak to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TargetAudience {
    #[default]
    General,
    YoungAdults,
    Professionals,
    Families,
    Seniors,
    LocalCommunity,
}

impl TargetAudience {
    pub const ALL: [TargetAudience; 6] = [
        TargetAudience::General,
        TargetAudience::YoungAdults,
        TargetAudience::Professionals,
        TargetAudience::Families,
        TargetAudience::Seniors,
        TargetAudience::LocalCommunity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargetAudience::General => "General",
            TargetAudience::YoungAdults => "Young Adults (18-35)",
            TargetAudience::Professionals => "Professionals",
            TargetAudience::Families => "Families",
            TargetAudience::Seniors => "Seniors",
            TargetAudience::LocalCommunity => "Local Community",
        }
    }
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything about the output the user can tune.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionOptions {
    pub style: CaptionStyle,
    pub length: CaptionLength,
    pub character_limit: CharacterLimit,
    pub include_cta: bool,
    /// Generate from business context alone, without an image
    pub text_only: bool,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            style: CaptionStyle::Professional,
            length: CaptionLength::Medium,
            character_limit: CharacterLimit::NoLimit,
            include_cta: true,
            text_only: false,
        }
    }
}

impl CaptionOptions {
    pub fn cta_instruction(&self) -> &'static str {
        if self.include_cta {
            "Include a subtle call-to-action that encourages engagement."
        } else {
            "Focus on storytelling without direct calls-to-action."
        }
    }

    /// "Text-Only" or "Image-Based", as shown in exports.
    pub fn mode_label(&self) -> &'static str {
        if self.text_only {
            "Text-Only"
        } else {
            "Image-Based"
        }
    }
}

/// What the user told us about the business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    /// Business name or type, e.g. "Rosie's Bakery" or "fitness studio"
    pub business: String,

    /// Optional website to analyze
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    /// Comma-separated keywords to emphasize
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub focus_keywords: String,

    /// Comma-separated words the captions should avoid
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub avoid_words: String,

    #[serde(default)]
    pub target_audience: TargetAudience,
}

impl BusinessContext {
    pub fn new(business: impl Into<String>) -> Self {
        Self {
            business: business.into(),
            ..Self::default()
        }
    }

    /// The business description sent to the model, with focus and audience
    /// qualifiers appended.
    pub fn enhanced_description(&self) -> String {
        let mut description = self.business.trim().to_string();
        let focus = self.focus_keywords.trim();
        if !focus.is_empty() {
            description.push_str(&format!(" (focus on: {focus})"));
        }
        if self.target_audience != TargetAudience::General {
            description.push_str(&format!(" (targeting: {})", self.target_audience));
        }
        description
    }

    /// Website URL, if one was given and is not blank.
    pub fn website(&self) -> Option<&str> {
        self.website_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}
