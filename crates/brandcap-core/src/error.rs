//! Error types for the brandcap caption pipeline.
//!
//! Errors are organized by stage (config, image intake, website analysis,
//! caption generation) so the CLI can print an actionable message and, where
//! it helps, a hint about what to try next.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for brandcap operations.
#[derive(Error, Debug)]
pub enum BrandcapError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image intake errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Website analysis errors
    #[error("Website analysis error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Caption generation errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while validating, decoding, or fetching an input image.
#[derive(Error, Debug)]
pub enum ImageError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {origin} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        origin: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Unrecognized or unsupported format
    #[error("Unsupported image format for {origin}: {message}")]
    UnsupportedFormat { origin: String, message: String },

    /// Decoding or re-encoding failed
    #[error("Decode error for {origin}: {message}")]
    Decode { origin: String, message: String },

    /// Decoding did not finish in time
    #[error("Decoding {origin} timed out after {timeout_ms}ms")]
    Timeout { origin: String, timeout_ms: u64 },

    /// Downloading a remote image failed
    #[error("Failed to download image {url}: {message}")]
    Download { url: String, message: String },

    /// `--website-image N` asked for an image the site analysis did not find
    #[error("Website image #{index} not available ({found} found)")]
    WebsiteImageMissing { index: usize, found: usize },
}

/// Website fetch and analysis errors.
#[derive(Error, Debug, Clone)]
pub enum ScrapeError {
    /// Input could not be turned into an http(s) URL
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// The site refused every user-agent profile (HTTP 403)
    #[error("Website access blocked: {url}")]
    Blocked { url: String },

    /// HTTP 404
    #[error("Website not found: {url}")]
    NotFound { url: String },

    /// Request timed out
    #[error("Website took too long to respond: {url}")]
    Timeout { url: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Response was not an HTML document
    #[error("{url} did not return HTML (content-type: {content_type})")]
    NotHtml { url: String, content_type: String },
}

impl ScrapeError {
    /// A short suggestion shown next to the error.
    ///
    /// Website analysis is optional, so every hint tells the user that
    /// captions can still be generated.
    pub fn hint(&self) -> &'static str {
        match self {
            ScrapeError::Blocked { .. } => {
                "The website is blocking automated access. Captions will still be generated \
                 from the business type and image, just without website-specific context."
            }
            ScrapeError::NotFound { .. } => {
                "Please check the URL and try again, or continue without website analysis."
            }
            ScrapeError::Timeout { .. } => {
                "The website may be slow or temporarily unavailable."
            }
            _ => "Continuing without website analysis; captions will still be generated.",
        }
    }
}

/// Caption generation errors.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// LLM API call failed
    #[error("{message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },

    /// The call did not complete within the configured timeout
    #[error("LLM call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// No usable caption text was returned
    #[error("Model returned no usable captions")]
    EmptyResponse,

    /// Provider is selected but no API key could be resolved
    #[error("{provider} API key not set. Set {env_var} or run `brandcap config set-key {provider} <KEY>`.")]
    MissingApiKey {
        provider: String,
        env_var: String,
    },

    /// Provider name not recognized
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
}

impl GenerationError {
    /// Map well-known API failures to a friendly title and remedy.
    pub fn hint(&self) -> Option<(&'static str, &'static str)> {
        match self {
            GenerationError::Llm {
                status_code,
                message,
            } => {
                let lower = message.to_lowercase();
                match status_code {
                    Some(429) if !lower.contains("rate_limit") => Some((
                        "API quota exceeded",
                        "Please check your billing at https://platform.openai.com/account/billing",
                    )),
                    Some(401) => Some((
                        "Authentication error",
                        "Please check your API key in the config file or environment.",
                    )),
                    Some(403) => Some((
                        "Access denied",
                        "Your API key doesn't have permission for this model.",
                    )),
                    _ if lower.contains("rate_limit") => Some((
                        "Rate limit",
                        "Too many requests. Please wait a moment and try again.",
                    )),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Convenience type alias for brandcap results.
pub type Result<T> = std::result::Result<T, BrandcapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_hint_blocked_mentions_fallback() {
        let err = ScrapeError::Blocked {
            url: "https://example.com".to_string(),
        };
        assert!(err.hint().contains("still be generated"));
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn test_generation_hint_quota() {
        let err = GenerationError::Llm {
            message: "HTTP 429: insufficient_quota".to_string(),
            status_code: Some(429),
        };
        let (title, _) = err.hint().unwrap();
        assert_eq!(title, "API quota exceeded");
    }

    #[test]
    fn test_generation_hint_rate_limit_message() {
        let err = GenerationError::Llm {
            message: "HTTP 429: rate_limit_exceeded".to_string(),
            status_code: Some(429),
        };
        let (title, _) = err.hint().unwrap();
        assert_eq!(title, "Rate limit");
    }

    #[test]
    fn test_generation_hint_auth() {
        let err = GenerationError::Llm {
            message: "unauthorized".to_string(),
            status_code: Some(401),
        };
        assert!(err.hint().unwrap().1.contains("API key"));
    }

    #[test]
    fn test_generation_hint_none_for_server_error() {
        let err = GenerationError::Llm {
            message: "bad gateway".to_string(),
            status_code: Some(502),
        };
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_missing_key_message_names_env_var() {
        let err = GenerationError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
