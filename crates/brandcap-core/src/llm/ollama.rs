//! Ollama provider for captioning with a locally pulled vision model.
//!
//! Uses the `/api/chat` endpoint so the caption instruction travels as a
//! system message. No authentication.

use super::provider::{LlmProvider, LlmRequest, LlmResponse, CAPTION_SYSTEM_PROMPT};
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Local caption writer backed by an Ollama server.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: [Turn<'a>; 2],
    stream: bool,
    options: Sampling,
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Serialize)]
struct Sampling {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    model: Option<String>,
    message: ReplyMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// `/api/tags` listing of pulled models.
#[derive(Deserialize)]
struct Tags {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

fn build_body<'a>(model: &'a str, request: &'a LlmRequest) -> ChatBody<'a> {
    ChatBody {
        model,
        messages: [
            Turn {
                role: "system",
                content: CAPTION_SYSTEM_PROMPT,
                images: Vec::new(),
            },
            Turn {
                role: "user",
                content: &request.prompt,
                images: request.image.iter().map(|i| i.data.as_str()).collect(),
            },
        ],
        stream: false,
        options: Sampling {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        },
    }
}

/// `llama3.2-vision` matches a pulled `llama3.2-vision:latest`.
fn model_pulled(tags: &Tags, model: &str) -> bool {
    tags.models.iter().any(|entry| {
        entry.name == model
            || (!model.contains(':') && entry.name.strip_suffix(":latest") == Some(model))
    })
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    /// Reachable and the configured vision model has been pulled.
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        let resp = match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            _ => return false,
        };
        match resp.json::<Tags>().await {
            Ok(tags) => {
                let pulled = model_pulled(&tags, &self.model);
                if !pulled {
                    tracing::warn!("Ollama is running but '{}' is not pulled", self.model);
                }
                pulled
            }
            Err(_) => false,
        }
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        let url = format!("{}/api/chat", self.endpoint);
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .json(&build_body(&self.model, request))
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| GenerationError::Llm {
                message: format!("Ollama request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Llm {
                message: format!("Ollama HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let reply: ChatReply = resp.json().await.map_err(|e| GenerationError::Llm {
            message: format!("Failed to parse Ollama response: {e}"),
            status_code: None,
        })?;

        if reply.done_reason.as_deref() == Some("length") {
            tracing::warn!(
                "{} stopped at {} tokens; the last caption may be cut off",
                self.model,
                request.max_tokens
            );
        }

        let text = reply.message.content.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let tokens_used = match (reply.prompt_eval_count, reply.eval_count) {
            (Some(p), Some(e)) => Some(p + e),
            (p, e) => p.or(e),
        };

        Ok(LlmResponse {
            text,
            model: reply.model.unwrap_or_else(|| self.model.clone()),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        // Local vision models are slow on first load
        Duration::from_secs(120)
    }
}
