//! OpenAI-compatible Chat Completions client.
//!
//! Posts to `{base_url}/chat/completions`, so the base URL carries any
//! version segment (`https://api.openai.com/v1`, a vLLM or LiteLLM proxy).
//! Requests are never retried.

use super::{ChatMessage, CompletionService};
use crate::config::LlmConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const MAX_LOGGED_BODY: usize = 2000;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config
                .api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_string())),
        })
    }

    fn api_url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

/// Join a base URL and an API path; the base is used as given.
fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pull `choices[0].message.content` out of a chat completion body.
fn extract_content(body: &Value) -> Result<String> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(Error::Llm(message.to_string()));
    }

    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Llm("response has no choices[0].message.content".to_string()))
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_LOGGED_BODY {
        let head: String = text.chars().take(MAX_LOGGED_BODY).collect();
        format!("{}... [truncated, {} bytes total]", head, text.len())
    } else {
        text.to_string()
    }
}

#[async_trait]
impl CompletionService for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.api_url("chat/completions");
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion"
        );

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                status = %status,
                body = %truncate(&text),
                "Chat completion response"
            );
        }

        if status.as_u16() == 401 {
            return Err(Error::Llm(
                "authentication failed (check LLM_API_KEY)".to_string(),
            ));
        }

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            Error::Llm(format!(
                "HTTP {}: non-JSON body ({}): {}",
                status,
                e,
                truncate(&text)
            ))
        })?;

        if !status.is_success() {
            let reason = extract_content(&parsed)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| truncate(&text));
            return Err(Error::Llm(format!("HTTP {}: {}", status, reason)));
        }

        extract_content(&parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
