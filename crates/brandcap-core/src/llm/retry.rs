//! Retry utilities for transient LLM failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::GenerationError;
use std::time::Duration;

/// Determine whether a generation error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx).
/// Non-retryable: auth failures, bad requests, missing models.
pub fn is_retryable(error: &GenerationError) -> bool {
    match error {
        GenerationError::Timeout { .. } => true,
        GenerationError::Llm {
            status_code,
            message,
        } => {
            // Classify by HTTP status code when available
            if let Some(code) = status_code {
                return *code == 429 || (500..=599).contains(code);
            }
            // Fallback for transport errors (connection refused, DNS failure)
            message.contains("timed out") || message.contains("connect")
        }
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
