//! Outbound chat-completion calls.
//!
//! Every provider call goes through [`CompletionProvider`], so services can be
//! tested against a mock and the production client can point at any
//! OpenAI-compatible endpoint.

use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::ProviderSettings;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
    /// Structured output against the given JSON Schema.
    JsonSchema(Value),
}

impl ResponseFormat {
    fn to_wire(&self) -> Option<Value> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(json!({ "type": "json_object" })),
            ResponseFormat::JsonSchema(schema) => Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "question_packet",
                    "schema": schema,
                }
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            temperature: 0.7,
            max_tokens: 1024,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Request body for a chat-completions endpoint serving `model`.
    pub fn to_body(&self, model: &str) -> Value {
        let mut body = json!({
            "model": model,
            "messages": self.messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if let Some(format) = self.response_format.to_wire() {
            body["response_format"] = format;
        }
        body
    }
}

/// A text-generation backend. Returns the raw text of the first choice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;
}

pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.expose_secret())
            .with_api_base(settings.api_base.clone());

        Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let body = request.to_body(&self.model);

        let response: Value = tokio::time::timeout(
            self.timeout,
            self.client.chat().create_byot::<Value, Value>(body),
        )
        .await
        .map_err(|_| {
            AppError::ProviderError(format!(
                "{} did not answer within {}s",
                self.model,
                self.timeout.as_secs()
            ))
        })??;

        extract_message_content(&response)
    }
}

/// Pulls the first choice's message text out of a chat-completions response.
pub fn extract_message_content(response: &Value) -> AppResult<String> {
    if let Some(finish) = response
        .pointer("/choices/0/finish_reason")
        .and_then(Value::as_str)
    {
        if finish == "length" {
            log::warn!("Completion was cut off by the token limit");
        }
    }

    match response.pointer("/choices/0/message/content") {
        Some(Value::String(text)) => Ok(text.clone()),
        // Some gateways return content as an array of text parts.
        Some(Value::Array(parts)) => Ok(parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("")),
        _ => Err(AppError::ProviderError(
            "completion response had no message content".to_string(),
        )),
    }
}
