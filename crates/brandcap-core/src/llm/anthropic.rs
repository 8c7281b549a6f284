//! Anthropic provider for caption generation via the Messages API.
//!
//! The photo goes first as a base64 block, then the caption prompt. A system
//! instruction keeps Claude from wrapping the captions in commentary.

use super::provider::{LlmProvider, LlmRequest, LlmResponse, CAPTION_SYSTEM_PROMPT};
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const API_VERSION: &str = "2023-06-01";

/// Claude-backed caption writer.
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn llm_error(message: String, status_code: Option<u16>) -> GenerationError {
        GenerationError::Llm {
            message,
            status_code,
        }
    }
}

#[derive(Serialize)]
struct CaptionMessages<'a> {
    model: &'a str,
    system: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: [UserTurn<'a>; 1],
}

#[derive(Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: Vec<Block<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Block<'a> {
    Image { source: PhotoSource<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct PhotoSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct CaptionReply {
    model: String,
    #[serde(default)]
    content: Vec<ReplyBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ReplyUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ReplyBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ReplyUsage {
    input_tokens: u32,
    output_tokens: u32,
}

fn build_body<'a>(model: &'a str, request: &'a LlmRequest) -> CaptionMessages<'a> {
    let mut content = Vec::with_capacity(2);
    if let Some(image) = &request.image {
        content.push(Block::Image {
            source: PhotoSource {
                kind: "base64",
                media_type: &image.media_type,
                data: &image.data,
            },
        });
    }
    content.push(Block::Text {
        text: &request.prompt,
    });

    CaptionMessages {
        model,
        system: CAPTION_SYSTEM_PROMPT,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        messages: [UserTurn {
            role: "user",
            content,
        }],
    }
}

/// Text blocks joined as paragraphs so each block splits into its own caption.
fn caption_text(reply: &CaptionReply) -> String {
    reply
        .content
        .iter()
        .filter_map(|block| match block {
            ReplyBlock::Text { text } => Some(text.trim()),
            ReplyBlock::Other => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&build_body(&self.model, request))
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| Self::llm_error(format!("Anthropic request failed: {e}"), None))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::llm_error(
                format!("Anthropic HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let reply: CaptionReply = resp
            .json()
            .await
            .map_err(|e| Self::llm_error(format!("Failed to parse Anthropic response: {e}"), None))?;

        if reply.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(
                "Claude hit the {} token limit; the last caption may be cut off",
                request.max_tokens
            );
        }

        let text = caption_text(&reply);
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(LlmResponse {
            text,
            model: reply.model,
            tokens_used: reply.usage.map(|u| u.input_tokens + u.output_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageInput;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_body_puts_photo_before_prompt() {
        let request = LlmRequest::new(
            "Create 3 captions",
            Some(ImageInput::from_bytes(&[1, 2, 3], "jpeg")),
        );
        let body = serde_json::to_value(build_body("claude-x", &request)).unwrap();
        assert_eq!(body["system"], CAPTION_SYSTEM_PROMPT);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[1], json!({ "type": "text", "text": "Create 3 captions" }));
    }

    #[test]
    fn test_text_only_body_has_single_block() {
        let request = LlmRequest::new("Create 3 captions", None);
        let body = serde_json::to_value(build_body("claude-x", &request)).unwrap();
        assert_eq!(body["messages"][0]["content"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_joins_text_blocks_as_paragraphs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "claude-x-2025",
                "stop_reason": "end_turn",
                "content": [
                    { "type": "text", "text": "Warm loaves at dawn." },
                    { "type": "tool_use", "id": "t1", "name": "noop", "input": {} },
                    { "type": "text", "text": "Sourdough Saturdays. " }
                ],
                "usage": { "input_tokens": 100, "output_tokens": 20 }
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&server.uri(), "key", "claude-x");
        let response = provider
            .generate(&LlmRequest::new("Create 3 captions", None))
            .await
            .unwrap();
        assert_eq!(response.text, "Warm loaves at dawn.\n\nSourdough Saturdays.");
        assert_eq!(response.model, "claude-x-2025");
        assert_eq!(response.tokens_used, Some(120));
    }

    #[tokio::test]
    async fn test_generate_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&server.uri(), "bad", "claude-x");
        let err = provider
            .generate(&LlmRequest::new("Create 3 captions", None))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Llm { status_code: Some(401), .. }));
    }
}
