//! Test utilities for pipeline scenarios.
//!
//! - [`ScriptedCompletion`]: completion service replaying queued replies and
//!   recording every request
//! - [`RecordingTool`]: tool handler that records its calls into a shared
//!   [`CallLog`] and returns a canned envelope

use crate::answer::AnswerEntry;
use crate::llm::{ChatMessage, CompletionService};
use crate::tools::{ToolArgs, ToolHandler};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Replays replies in order. Once the script runs out every further call
/// fails, so an unexpected model call shows up as a test failure.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failing reply after the existing script
    pub fn then_fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(Error::Llm(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Shared, ordered record of tool invocations: `(tool, args)`.
pub type CallLog = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

pub struct RecordingTool {
    name: String,
    log: CallLog,
    output: std::result::Result<String, String>,
}

impl RecordingTool {
    /// Succeeds with a single-element envelope whose response is `response`.
    pub fn ok(name: &str, response: impl Into<Value>, log: &CallLog) -> Self {
        let entry = AnswerEntry::success(
            format!("{} completed", name),
            response.into(),
            String::new(),
        );
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            output: Ok(entry.to_tool_output()),
        }
    }

    pub fn failing(name: &str, message: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            output: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl ToolHandler for RecordingTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), args.values().to_vec()));
        tokio::task::yield_now().await;
        self.output.clone().map_err(Error::ToolExecution)
    }
}

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}
