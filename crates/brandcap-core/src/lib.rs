//! Brandcap Core - brand-aware social media caption generation.
//!
//! Brandcap takes an image and a little business context, optionally reads
//! the company's website for brand details, and asks a vision-capable LLM
//! for three caption variants.
//!
//! # Architecture
//!
//! ```text
//! Input → Website analysis (optional) → Prompt → LLM → Caption variants
//! ```
//!
//! Website analysis is best-effort: when it fails, captions are still
//! generated from the business type alone.
//!
//! # Usage
//!
//! ```rust,ignore
//! use brandcap_core::{BusinessContext, Brandcap, CaptionRequest, Config, ImageSource};
//!
//! #[tokio::main]
//! async fn main() -> brandcap_core::Result<()> {
//!     let brandcap = Brandcap::new(Config::load()?);
//!
//!     let mut context = BusinessContext::new("bakery");
//!     context.website_url = Some("rosies-bakery.com".into());
//!     let request = CaptionRequest::new(context)
//!         .with_image(ImageSource::Path("./bread.jpg".into()));
//!
//!     let generated = brandcap.generate(&request).await?;
//!     for variant in &generated.captions.variants {
//!         println!("{}", variant.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod captions;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod image;
pub mod llm;
pub mod output;
pub mod prompt;
pub mod request;
pub mod scrape;
pub mod types;

pub use config::Config;
pub use error::{BrandcapError, ConfigError, GenerationError, ImageError, Result, ScrapeError};
pub use export::{BatchItem, Exporter};
pub use history::SessionHistory;
pub use image::{ImageDiscovery, ImageLoader, PreparedImage};
pub use llm::{CaptionGenerator, GenerateOptions, LlmProvider, LlmProviderFactory, ModelTier};
pub use output::{BatchRecord, OutputFormat, OutputWriter};
pub use prompt::{
    BusinessContext, CaptionLength, CaptionOptions, CaptionStyle, CharacterLimit, PromptBuilder,
    TargetAudience,
};
pub use request::{CaptionRequest, ImageSource};
pub use scrape::WebsiteAnalyzer;
pub use types::{CaptionSet, CaptionVariant, PlatformFit, WebsiteAnalysis, WebsiteImage};

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Captions plus the image that was sent with them.
#[derive(Debug, Clone)]
pub struct Generated {
    pub captions: CaptionSet,
    /// `None` in text-only mode
    pub image: Option<PreparedImage>,
}

/// Brandcap session - the main entry point for caption generation.
///
/// Holds the website analysis cache and the session's used-caption history,
/// so one instance should serve the whole session (and every image of a batch).
pub struct Brandcap {
    config: Config,
    analyzer: WebsiteAnalyzer,
    loader: ImageLoader,
    history: RwLock<SessionHistory>,
    provider: Option<Arc<dyn LlmProvider>>,
}

impl Brandcap {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing brandcap v{}", VERSION);
        let client = reqwest::Client::new();
        let analyzer = WebsiteAnalyzer::new(config.scrape.clone(), client.clone());
        let loader = ImageLoader::new(
            config.limits.clone(),
            client,
            Duration::from_millis(config.scrape.timeout_ms),
        );
        let history = SessionHistory::new(config.generation.duplicate_threshold);
        Self {
            config,
            analyzer,
            loader,
            history: RwLock::new(history),
            provider: None,
        }
    }

    /// Use this provider for every request instead of building one from config.
    pub fn with_provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.provider = Some(Arc::from(provider));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Analyze a company website (cached for the session).
    pub async fn analyze(&self, url: &str) -> std::result::Result<WebsiteAnalysis, ScrapeError> {
        self.analyzer.analyze(url).await
    }

    /// Build the generator for a request's provider, tier, and model.
    pub fn generator(
        &self,
        request: &CaptionRequest,
    ) -> std::result::Result<CaptionGenerator, GenerationError> {
        let options = GenerateOptions::from_config(&self.config.generation, &self.config.limits);
        let provider = match &self.provider {
            Some(provider) => provider.clone(),
            None => Arc::from(LlmProviderFactory::create(
                &self.config.llm.provider,
                &self.config.llm,
                request.tier,
                request.model_override.as_deref(),
            )?),
        };
        Ok(CaptionGenerator::from_arc(provider, options))
    }

    /// Run the whole pipeline for one request.
    ///
    /// A failed website analysis is recorded in `website_error` and does not
    /// stop generation. Image and LLM failures are returned as errors.
    pub async fn generate(&self, request: &CaptionRequest) -> Result<Generated> {
        // Fail on a missing API key before spending time on the website
        let generator = self.generator(request)?;

        let (website, website_error) = match request.context.website() {
            Some(url) if self.config.scrape.enabled => match self.analyze(url).await {
                Ok(analysis) => (Some(analysis), None),
                Err(e) => {
                    let message = format!("{e}. {}", e.hint());
                    tracing::warn!("Website analysis failed: {message}");
                    (None, Some(message))
                }
            },
            _ => (None, None),
        };

        let mut options = request.options.clone();
        let image = if options.text_only {
            None
        } else {
            self.prepare_image(&request.image, website.as_ref()).await?
        };
        if image.is_none() {
            options.text_only = true;
        }

        let prompt = PromptBuilder::build(&request.context, &options, website.as_ref());
        tracing::debug!("Prompt:\n{prompt}");

        let history = self.history.read().await.clone();
        let generation = generator
            .generate(&prompt, image.as_ref().map(PreparedImage::to_input), &history)
            .await?;

        tracing::info!(
            "Generated {} captions with {} in {}ms",
            generation.variants.len(),
            generation.model,
            generation.latency_ms
        );

        let captions = CaptionSet {
            business: request.context.business.trim().to_string(),
            image_source: image
                .as_ref()
                .map(|img| img.origin.clone())
                .unwrap_or_else(|| ImageSource::None.to_string()),
            variants: generation.variants,
            raw_text: generation.raw_text,
            provider: generator.provider_name().to_string(),
            model: generation.model,
            tier: request.tier,
            options,
            website,
            website_error,
            tokens_used: generation.tokens_used,
            latency_ms: generation.latency_ms,
            attempts: generation.attempts,
            duplicates_remaining: generation.duplicates_remaining,
            generated_at: Local::now(),
        };
        Ok(Generated { captions, image })
    }

    /// Load the image a request points at. `ImageSource::None` yields `None`.
    pub async fn prepare_image(
        &self,
        source: &ImageSource,
        website: Option<&WebsiteAnalysis>,
    ) -> Result<Option<PreparedImage>> {
        let prepared = match source {
            ImageSource::None => return Ok(None),
            ImageSource::Path(path) => self.loader.load_path(path).await?,
            ImageSource::Url(url) => self.loader.fetch_remote(url).await?,
            ImageSource::WebsiteImage(index) => {
                let images = website.map(|w| w.images.as_slice()).unwrap_or_default();
                let image = index
                    .checked_sub(1)
                    .and_then(|i| images.get(i))
                    .ok_or(ImageError::WebsiteImageMissing {
                        index: *index,
                        found: images.len(),
                    })?;
                self.loader.fetch_remote(&image.url).await?
            }
        };
        tracing::debug!(
            "Prepared {} ({}x{}, {})",
            prepared.origin,
            prepared.width,
            prepared.height,
            prepared.source_format
        );
        Ok(Some(prepared))
    }

    /// Mark a caption as used so later generations avoid it.
    pub async fn mark_used(&self, text: &str, business: &str) -> u32 {
        self.history.write().await.mark_used(text, business)
    }

    pub async fn unmark_used(&self, text: &str) -> bool {
        self.history.write().await.unmark(text)
    }

    /// Copy of the session history.
    pub async fn history(&self) -> SessionHistory {
        self.history.read().await.clone()
    }

    /// Drop cached website analyses and the used-caption history.
    pub async fn reset(&self) {
        self.analyzer.clear_cache().await;
        self.history.write().await.clear();
    }
}
