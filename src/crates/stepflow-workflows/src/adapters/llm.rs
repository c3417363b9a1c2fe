//! OpenAI-compatible chat completions client
//!
//! Works with any provider exposing `POST {base_url}/chat/completions`
//! (OpenAI, Groq, OpenRouter, local gateways).
//!
//! ```rust,ignore
//! use stepflow_workflows::adapters::{ChatCompletionsConfig, ChatCompletionsModel};
//!
//! let model = ChatCompletionsModel::new(
//!     ChatCompletionsConfig::new("https://api.groq.com/openai/v1", "llama3-8b-8192")
//!         .with_api_key(api_key)
//!         .with_temperature(0.3),
//! )?;
//! let reply = model.complete("Summarize this transcript: ...").await?;
//! ```

use crate::collaborators::LanguageModel;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for [`ChatCompletionsModel`]
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl ChatCompletionsConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`LanguageModel`] over an OpenAI-compatible HTTP API
#[derive(Clone)]
pub struct ChatCompletionsModel {
    config: ChatCompletionsConfig,
    client: Client,
}

impl ChatCompletionsModel {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            stream: false,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await?;
        extract_content(reply)
    }
}

fn extract_content(reply: ChatResponse) -> Result<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CollaboratorError::Parse("completion had no content".to_string()))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let model =
            ChatCompletionsModel::new(ChatCompletionsConfig::new("http://localhost:8000/v1/", "m"))
                .unwrap();
        assert_eq!(model.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "llama3-8b-8192",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: None,
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "llama3-8b-8192",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_extract_content() {
        let reply: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }))
        .unwrap();
        assert_eq!(extract_content(reply).unwrap(), "hello");

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(extract_content(empty), Err(CollaboratorError::Parse(_))));
    }
}
