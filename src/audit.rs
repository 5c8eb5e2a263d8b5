//! Audit log
//!
//! Append-only JSONL record of tool calls and completion calls, for
//! compliance and debugging. Write failures are logged and never block the
//! pipeline.

use crate::llm::{ChatMessage, CompletionService};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

const PROMPT_PREVIEW_CHARS: usize = 500;

/// Entry in the audit log
#[derive(Debug, Serialize)]
struct AuditEntry {
    timestamp: DateTime<Utc>,
    entry_type: &'static str,
    tool_name: Option<String>,
    model: Option<String>,
    args: Value,
    result: Option<Value>,
    error: Option<String>,
    duration_ms: u64,
    status: &'static str,
}

struct AuditLogWriter {
    path: PathBuf,
}

impl AuditLogWriter {
    fn write(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AuditLog {
    writer: Arc<Mutex<AuditLogWriter>>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl AuditLog {
    /// # Arguments
    /// * `log_path` - Path to the audit log file (JSONL format)
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(AuditLogWriter {
                path: log_path.into(),
            })),
        }
    }

    async fn write(&self, entry: AuditEntry) {
        let writer = self.writer.lock().await;
        if let Err(e) = writer.write(&entry) {
            tracing::warn!(error = %e, "Failed to write audit log entry");
        }
    }

    pub async fn tool_call_start(&self, tool_name: &str, args: &[Value]) {
        self.write(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "tool_call_start",
            tool_name: Some(tool_name.to_string()),
            model: None,
            args: Value::Array(args.to_vec()),
            result: None,
            error: None,
            duration_ms: 0,
            status: "pending",
        })
        .await;
    }

    pub async fn tool_call_complete(
        &self,
        tool_name: &str,
        args: &[Value],
        result: std::result::Result<&str, String>,
        duration_ms: u64,
    ) {
        let (result, error, status) = match result {
            Ok(output) => (Some(output_value(output)), None, "success"),
            Err(e) => (None, Some(e), "error"),
        };

        self.write(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "tool_call_complete",
            tool_name: Some(tool_name.to_string()),
            model: None,
            args: Value::Array(args.to_vec()),
            result,
            error,
            duration_ms,
            status,
        })
        .await;
    }

    pub async fn llm_call_complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        result: std::result::Result<&str, String>,
        duration_ms: u64,
    ) {
        let (result, error, status) = match result {
            Ok(text) => (Some(Value::String(truncate(text))), None, "success"),
            Err(e) => (None, Some(e), "error"),
        };
        let prompt_preview = messages
            .last()
            .map(|m| truncate(&m.content))
            .unwrap_or_default();

        self.write(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "llm_call_complete",
            tool_name: None,
            model: Some(model.to_string()),
            args: serde_json::json!({
                "messages": messages.len(),
                "prompt_preview": prompt_preview,
            }),
            result,
            error,
            duration_ms,
            status,
        })
        .await;
    }
}

/// Tool outputs are JSON text; store them structured when they parse.
fn output_value(output: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|_| Value::String(output.to_string()))
}

fn truncate(text: &str) -> String {
    if text.chars().count() > PROMPT_PREVIEW_CHARS {
        let head: String = text.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Completion service that records every call in the audit log
pub struct AuditedCompletion {
    inner: Arc<dyn CompletionService>,
    audit: AuditLog,
}

impl AuditedCompletion {
    pub fn new(inner: Arc<dyn CompletionService>, audit: AuditLog) -> Self {
        Self { inner, audit }
    }
}

#[async_trait]
impl CompletionService for AuditedCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let started = Instant::now();
        let result = self.inner.complete(messages).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let logged = match &result {
            Ok(text) => Ok(text.as_str()),
            Err(e) => Err(e.to_string()),
        };
        self.audit
            .llm_call_complete(self.inner.model_name(), messages, logged, duration_ms)
            .await;
        result
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
