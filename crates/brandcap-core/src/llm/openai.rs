//! OpenAI LLM provider using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array. The
//! endpoint is configurable, so OpenAI-compatible APIs work too.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

fn build_body(model: &str, request: &LlmRequest) -> ChatRequest {
    let mut content = vec![ChatContent::Text {
        text: request.prompt.clone(),
    }];
    if let Some(image) = &request.image {
        content.push(ChatContent::ImageUrl {
            image_url: ImageUrl {
                url: image.data_url(),
            },
        });
    }

    ChatRequest {
        model: model.to_string(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content,
        }],
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        let start = Instant::now();
        let body = build_body(&self.model, request);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| GenerationError::Llm {
                message: format!("OpenAI request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Llm {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| GenerationError::Llm {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(LlmResponse {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
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

    #[test]
    fn test_text_only_body_has_no_image_part() {
        let request = LlmRequest::new("Write captions", None);
        let json = serde_json::to_value(build_body("gpt-4o-mini", &request)).unwrap();
        let content = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn test_image_body_uses_data_url() {
        let image = ImageInput::from_bytes(&[1, 2, 3], "png");
        let request = LlmRequest::new("Write captions", Some(image));
        let json = serde_json::to_value(build_body("gpt-4o", &request)).unwrap();
        let content = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content[1]["type"], "image_url");
        assert!(content[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }
}
