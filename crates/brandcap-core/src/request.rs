//! What to generate: business context, caption options, image source, and tier.

use std::fmt;
use std::path::PathBuf;

use crate::config::GenerationConfig;
use crate::llm::ModelTier;
use crate::prompt::{BusinessContext, BusinessTemplate, CaptionOptions, CaptionStyle};

/// Where the image for a request comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSource {
    /// Text-only generation
    #[default]
    None,
    /// A local file
    Path(PathBuf),
    /// The Nth (1-based) image found on the analyzed website
    WebsiteImage(usize),
    /// A remote image URL
    Url(String),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::None => f.write_str("none"),
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::WebsiteImage(n) => write!(f, "website image #{n}"),
            ImageSource::Url(url) => f.write_str(url),
        }
    }
}

/// A single caption generation request.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub context: BusinessContext,
    pub options: CaptionOptions,
    pub image: ImageSource,
    pub tier: ModelTier,
    /// Use this model instead of the tier's configured one
    pub model_override: Option<String>,
}

impl CaptionRequest {
    pub fn new(context: BusinessContext) -> Self {
        Self {
            context,
            options: CaptionOptions::default(),
            image: ImageSource::None,
            tier: ModelTier::Standard,
            model_override: None,
        }
    }

    /// Start from the configured caption defaults.
    pub fn from_config(context: BusinessContext, generation: &GenerationConfig) -> Self {
        Self::new(context).with_options(CaptionOptions {
            style: generation.style,
            length: generation.length,
            character_limit: generation.character_limit,
            include_cta: generation.include_cta,
            text_only: false,
        })
    }

    pub fn with_options(mut self, options: CaptionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_style(mut self, style: CaptionStyle) -> Self {
        self.options.style = style;
        self
    }

    /// Apply a category template's tone. An explicit style wins.
    pub fn with_template(mut self, template: &BusinessTemplate, explicit_style: Option<CaptionStyle>) -> Self {
        self.options.style = explicit_style.unwrap_or(template.style);
        self
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.options.text_only = image == ImageSource::None;
        self.image = image;
        self
    }

    /// Generate without any image.
    pub fn text_only(self) -> Self {
        self.with_image(ImageSource::None)
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model_override = model.filter(|m| !m.trim().is_empty());
        self
    }
}
