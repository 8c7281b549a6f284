//! Core data types produced by the caption pipeline.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::llm::ModelTier;
use crate::prompt::CaptionOptions;

/// Brand information scraped from a company website.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebsiteAnalysis {
    /// Normalized URL that was analyzed
    pub url: String,

    /// Contents of the main page's `<title>`
    pub title: String,

    /// `meta[name=description]` content
    pub description: String,

    /// `meta[name=keywords]` content
    pub keywords: String,

    /// Deduplicated "about us" style text, at most 1200 characters
    pub about_text: String,

    /// Short service/product snippets, at most 15
    pub services: Vec<String>,

    /// Brand tone label
    pub tone: String,

    /// Every page that contributed content, main page first
    pub pages_analyzed: Vec<String>,

    /// Candidate images found on the main page
    pub images: Vec<WebsiteImage>,
}

impl WebsiteAnalysis {
    /// Company name from the page title: the part before the first `|`.
    ///
    /// Returns `None` when the title is empty.
    pub fn company_name(&self) -> Option<String> {
        let name = self.title.split('|').next().unwrap_or_default().trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// A candidate image discovered on a website.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebsiteImage {
    /// Absolute image URL
    pub url: String,

    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub alt: String,

    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,

    /// alt, else title, else "Website image"
    pub description: String,
}

/// Platform character budgets used for the suitability markers.
pub const PLATFORM_LIMITS: [(&str, usize); 3] =
    [("Facebook", 500), ("Instagram", 400), ("LinkedIn", 700)];

/// Whether a caption fits each platform's recommended length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformFit {
    pub facebook: bool,
    pub instagram: bool,
    pub linkedin: bool,
}

impl PlatformFit {
    pub fn for_chars(chars: usize) -> Self {
        Self {
            facebook: chars <= 500,
            instagram: chars <= 400,
            linkedin: chars <= 700,
        }
    }

    /// `(platform, limit, fits)` triples in display order.
    pub fn entries(&self) -> [(&'static str, usize, bool); 3] {
        let fits = [self.facebook, self.instagram, self.linkedin];
        let mut out = [("", 0, false); 3];
        for (i, (name, limit)) in PLATFORM_LIMITS.iter().enumerate() {
            out[i] = (name, *limit, fits[i]);
        }
        out
    }
}

/// One caption alternative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionVariant {
    /// 1-based position in the set
    pub index: usize,

    pub text: String,

    /// Length in Unicode scalar values
    pub char_count: usize,

    pub fit: PlatformFit,

    /// Similar to a caption already marked as used this session
    pub previously_used: bool,
}

impl CaptionVariant {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        Self {
            index,
            text,
            char_count,
            fit: PlatformFit::for_chars(char_count),
            previously_used: false,
        }
    }
}

/// The result of one caption generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSet {
    /// Business name/type as entered
    pub business: String,

    /// Where the image came from ("path/to/file.jpg", a URL, or "none")
    pub image_source: String,

    pub variants: Vec<CaptionVariant>,

    /// Model output exactly as returned
    pub raw_text: String,

    pub provider: String,
    pub model: String,
    pub tier: ModelTier,

    pub options: CaptionOptions,

    /// Website analysis used for the prompt, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteAnalysis>,

    /// Set when a website URL was given but analysis failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,

    pub latency_ms: u64,

    /// Generations performed, including duplicate-avoidance retries
    pub attempts: u32,

    /// Still too similar to used captions after every attempt
    pub duplicates_remaining: bool,

    pub generated_at: DateTime<Local>,
}

impl CaptionSet {
    /// Caption texts joined with blank lines, as written to the download file.
    pub fn captions_text(&self) -> String {
        self.variants
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Look up a variant by its 1-based index.
    pub fn variant(&self, index: usize) -> Option<&CaptionVariant> {
        self.variants.iter().find(|v| v.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_name_from_title() {
        let analysis = WebsiteAnalysis {
            title: "  Acme Roofing | Home ".to_string(),
            ..Default::default()
        };
        assert_eq!(analysis.company_name().as_deref(), Some("Acme Roofing"));
    }

    #[test]
    fn test_company_name_empty_title() {
        assert!(WebsiteAnalysis::default().company_name().is_none());
        let analysis = WebsiteAnalysis {
            title: " | tagline".to_string(),
            ..Default::default()
        };
        assert!(analysis.company_name().is_none());
    }

    #[test]
    fn test_platform_fit_boundaries() {
        let fit = PlatformFit::for_chars(400);
        assert!(fit.facebook && fit.instagram && fit.linkedin);

        let fit = PlatformFit::for_chars(401);
        assert!(fit.facebook && !fit.instagram && fit.linkedin);

        let fit = PlatformFit::for_chars(701);
        assert!(!fit.facebook && !fit.instagram && !fit.linkedin);
    }

    #[test]
    fn test_platform_fit_entries_order() {
        let entries = PlatformFit::for_chars(450).entries();
        assert_eq!(entries[0], ("Facebook", 500, true));
        assert_eq!(entries[1], ("Instagram", 400, false));
        assert_eq!(entries[2], ("LinkedIn", 700, true));
    }

    #[test]
    fn test_variant_counts_chars_not_bytes() {
        let variant = CaptionVariant::new(1, "café ☕");
        assert_eq!(variant.char_count, 6);
    }
}
