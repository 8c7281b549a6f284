//! Caption generation with transient-failure retries and duplicate avoidance.
//!
//! Each generation asks the provider for three captions. Transport failures
//! worth retrying (timeouts, 429, 5xx) are retried with exponential backoff.
//! When too many of the returned captions resemble ones already marked as
//! used, the prompt is resent with a "make them different" suffix.

use super::provider::{ImageInput, LlmProvider, LlmRequest, LlmResponse};
use super::retry;
use crate::captions::parse_variants;
use crate::config::{GenerationConfig, LimitsConfig};
use crate::error::GenerationError;
use crate::history::SessionHistory;
use crate::prompt::PromptBuilder;
use crate::types::CaptionVariant;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the caption generator.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum retries per request on transient errors
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Generations tried before accepting captions that repeat used ones
    pub regenerate_attempts: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerateOptions {
    /// Same values a default config produces.
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default(), &LimitsConfig::default())
    }
}

impl GenerateOptions {
    pub fn from_config(generation: &GenerationConfig, limits: &LimitsConfig) -> Self {
        Self {
            timeout_ms: limits.llm_timeout_ms,
            retry_attempts: generation.retry_attempts,
            retry_delay_ms: generation.retry_delay_ms,
            regenerate_attempts: generation.regenerate_attempts.max(1),
            max_tokens: generation.max_tokens,
            temperature: generation.temperature,
        }
    }
}

/// Captions accepted by the generator, with usage accounting.
#[derive(Debug, Clone)]
pub struct Generation {
    pub variants: Vec<CaptionVariant>,
    pub raw_text: String,
    pub model: String,
    /// Summed over every generation attempt; `None` if the provider never reported usage
    pub tokens_used: Option<u32>,
    pub latency_ms: u64,
    /// Generations performed (1 unless duplicates forced a regeneration)
    pub attempts: u32,
    /// Accepted despite repeating used captions because attempts ran out
    pub duplicates_remaining: bool,
}

/// Generates caption sets through a single LLM provider.
pub struct CaptionGenerator {
    provider: Arc<dyn LlmProvider>,
    options: GenerateOptions,
}

impl CaptionGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, options: GenerateOptions) -> Self {
        Self::from_arc(Arc::from(provider), options)
    }

    pub fn from_arc(provider: Arc<dyn LlmProvider>, options: GenerateOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Generate captions for a prompt, avoiding captions in `history`.
    ///
    /// A set is accepted once fewer than half of its captions are duplicates.
    /// After `regenerate_attempts` the last set is returned with
    /// `duplicates_remaining` set.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<ImageInput>,
        history: &SessionHistory,
    ) -> Result<Generation, GenerationError> {
        let max_attempts = self.options.regenerate_attempts.max(1);
        let mut tokens_used: Option<u32> = None;
        let mut latency_ms = 0u64;
        let mut last = None;

        for attempt in 0..max_attempts {
            let request = LlmRequest::new(
                PromptBuilder::with_retry_suffix(prompt, attempt),
                image.clone(),
            )
            .with_sampling(self.options.max_tokens, self.options.temperature);

            let response = self.call_with_retry(&request).await?;
            latency_ms += response.latency_ms;
            if let Some(tokens) = response.tokens_used {
                tokens_used = Some(tokens_used.unwrap_or(0) + tokens);
            }

            let variants: Vec<CaptionVariant> = parse_variants(&response.text)?
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    let mut variant = CaptionVariant::new(i + 1, text);
                    variant.previously_used = history.is_duplicate(&variant.text);
                    variant
                })
                .collect();

            let duplicates = variants.iter().filter(|v| v.previously_used).count();
            let accepted = duplicates * 2 < variants.len();
            if !accepted {
                tracing::warn!(
                    "Attempt {}/{max_attempts}: {duplicates} of {} captions were used before",
                    attempt + 1,
                    variants.len()
                );
            }

            let generation = Generation {
                variants,
                raw_text: response.text,
                model: response.model,
                tokens_used,
                latency_ms,
                attempts: attempt + 1,
                duplicates_remaining: !accepted,
            };
            if accepted {
                return Ok(generation);
            }
            last = Some(generation);
        }

        last.ok_or(GenerationError::EmptyResponse)
    }

    /// One provider call, retried on transient failures.
    async fn call_with_retry(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        let timeout = Duration::from_millis(self.options.timeout_ms);
        let mut attempt = 0u32;

        loop {
            let result = match tokio::time::timeout(timeout, self.provider.generate(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout {
                    timeout_ms: self.options.timeout_ms,
                }),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.options.retry_attempts && retry::is_retryable(&e) => {
                    let delay = retry::backoff_duration(attempt, self.options.retry_delay_ms);
                    attempt += 1;
                    tracing::debug!(
                        "Retry {attempt}/{} via {} after {delay:?}: {e}",
                        self.options.retry_attempts,
                        self.provider.name()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const FRESH: &str = "Morning light on warm loaves.\n\nOur bakers start at four.\n\nCome taste the difference.";

    /// A configurable mock provider.
    ///
    /// Each call to `generate()` invokes the response factory with the
    /// current call index so tests can vary results per attempt.
    struct MockProvider {
        response_fn: Box<dyn Fn(u32) -> Result<LlmResponse, GenerationError> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        prompts: Arc<Mutex<Vec<String>>>,
        delay: Option<Duration>,
    }

    impl MockProvider {
        fn new(
            response_fn: impl Fn(u32) -> Result<LlmResponse, GenerationError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                response_fn: Box::new(response_fn),
                call_count: Arc::new(AtomicU32::new(0)),
                prompts: Arc::new(Mutex::new(Vec::new())),
                delay: None,
            }
        }

        fn success(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_| Ok(response(&text)))
        }

        fn failing(status_code: Option<u16>, message: &str) -> Self {
            let message = message.to_string();
            Self::new(move |_| {
                Err(GenerationError::Llm {
                    message: message.clone(),
                    status_code,
                })
            })
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    fn response(text: &str) -> LlmResponse {
        LlmResponse {
            text: text.to_string(),
            model: "mock-v1".to_string(),
            tokens_used: Some(40),
            latency_ms: 10,
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-v1"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)(idx)
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    fn fast_options() -> GenerateOptions {
        GenerateOptions {
            timeout_ms: 5000,
            retry_attempts: 0,
            retry_delay_ms: 10,
            regenerate_attempts: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_options_match_default_config() {
        let options = GenerateOptions::default();
        let generation = GenerationConfig::default();
        assert_eq!(options.retry_attempts, generation.retry_attempts);
        assert_eq!(options.retry_attempts, 3);
        assert_eq!(options.retry_delay_ms, generation.retry_delay_ms);
        assert_eq!(options.timeout_ms, LimitsConfig::default().llm_timeout_ms);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let provider = MockProvider::success(FRESH);
        let calls = provider.call_count.clone();
        let generator = CaptionGenerator::new(Box::new(provider), fast_options());

        let generation = generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .unwrap();

        assert_eq!(generation.variants.len(), 3);
        assert_eq!(generation.variants[2].index, 3);
        assert_eq!(generation.variants[0].text, "Morning light on warm loaves.");
        assert_eq!(generation.attempts, 1);
        assert_eq!(generation.tokens_used, Some(40));
        assert!(!generation.duplicates_remaining);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_on_transient_error() {
        let provider = MockProvider::new(|idx| {
            if idx == 0 {
                Err(GenerationError::Llm {
                    message: "HTTP 429: rate limited".to_string(),
                    status_code: Some(429),
                })
            } else {
                Ok(response(FRESH))
            }
        });
        let calls = provider.call_count.clone();
        let options = GenerateOptions {
            retry_attempts: 1,
            ..fast_options()
        };
        let generator = CaptionGenerator::new(Box::new(provider), options);

        let generation = generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .unwrap();
        assert_eq!(generation.variants.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_auth_error() {
        let provider = MockProvider::failing(Some(401), "HTTP 401: invalid api key");
        let calls = provider.call_count.clone();
        let options = GenerateOptions {
            retry_attempts: 3,
            ..fast_options()
        };
        let generator = CaptionGenerator::new(Box::new(provider), options);

        let err = generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Llm { status_code: Some(401), .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let provider = MockProvider::failing(Some(503), "HTTP 503: unavailable");
        let calls = provider.call_count.clone();
        let options = GenerateOptions {
            retry_attempts: 2,
            ..fast_options()
        };
        let generator = CaptionGenerator::new(Box::new(provider), options);

        assert!(generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let provider = MockProvider::success(FRESH).with_delay(Duration::from_millis(500));
        let options = GenerateOptions {
            timeout_ms: 50,
            ..fast_options()
        };
        let generator = CaptionGenerator::new(Box::new(provider), options);

        let err = generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_empty_response_is_error() {
        let generator =
            CaptionGenerator::new(Box::new(MockProvider::success("   ")), fast_options());
        let err = generator
            .generate("prompt", None, &SessionHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_regenerates_when_mostly_duplicates() {
        let mut history = SessionHistory::default();
        history.mark_used("Morning light on warm loaves.", "bakery");
        history.mark_used("Our bakers start at four.", "bakery");

        let provider = MockProvider::new(|idx| {
            if idx == 0 {
                Ok(response(FRESH))
            } else {
                Ok(response("Something new.\n\nAnother angle.\n\nA third idea."))
            }
        });
        let prompts = provider.prompts.clone();
        let generator = CaptionGenerator::new(Box::new(provider), fast_options());

        let generation = generator.generate("base prompt", None, &history).await.unwrap();
        assert_eq!(generation.attempts, 2);
        assert_eq!(generation.tokens_used, Some(80));
        assert!(!generation.duplicates_remaining);
        assert!(generation.variants.iter().all(|v| !v.previously_used));

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts[0], "base prompt");
        assert!(prompts[1].contains("RETRY #2"));
    }

    #[tokio::test]
    async fn test_one_duplicate_is_accepted_and_flagged() {
        let mut history = SessionHistory::default();
        history.mark_used("Come taste the difference.", "bakery");

        let generator =
            CaptionGenerator::new(Box::new(MockProvider::success(FRESH)), fast_options());
        let generation = generator.generate("prompt", None, &history).await.unwrap();

        assert_eq!(generation.attempts, 1);
        assert!(generation.variants[2].previously_used);
        assert!(!generation.variants[0].previously_used);
    }

    #[tokio::test]
    async fn test_duplicates_remaining_after_all_attempts() {
        let mut history = SessionHistory::default();
        history.mark_used("Morning light on warm loaves.", "");
        history.mark_used("Our bakers start at four.", "");

        let provider = MockProvider::success(FRESH);
        let calls = provider.call_count.clone();
        let generator = CaptionGenerator::new(Box::new(provider), fast_options());

        let generation = generator.generate("prompt", None, &history).await.unwrap();
        assert_eq!(generation.attempts, 3);
        assert!(generation.duplicates_remaining);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_options_from_config() {
        let generation = GenerationConfig {
            regenerate_attempts: 0,
            ..Default::default()
        };
        let options = GenerateOptions::from_config(&generation, &LimitsConfig::default());
        assert_eq!(options.regenerate_attempts, 1);
        assert_eq!(options.timeout_ms, LimitsConfig::default().llm_timeout_ms);
    }
}
