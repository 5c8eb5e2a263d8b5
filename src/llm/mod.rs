//! Completion service abstraction
//!
//! The pipeline only needs "ordered role/content messages in, free text
//! out". Anything that can do that (a hosted model, a local proxy, a test
//! script) implements [`CompletionService`].

mod openai;

pub use openai::OpenAiCompatibleClient;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete the conversation, returning the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Identifier used in logs and the audit trail
    fn model_name(&self) -> &str {
        "unknown"
    }
}
