//! Tool execution
//!
//! Looks a tool up, resolves its arguments against the caller context and
//! awaits the handler. Every failure is folded into a [`StructuredError`];
//! nothing is retried.

use crate::answer::StructuredError;
use crate::audit::AuditLog;
use crate::resolver::ArgumentResolver;
use crate::tools::ToolRegistry;
use crate::wallet::CallerContext;
use crate::{Error, ErrorKind, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Raw handler output (a JSON single-element answer array)
    Output(String),
    Failed(StructuredError),
}

impl ExecutionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failed(_))
    }

    /// Text appended to the processor aggregate
    pub fn into_text(self) -> String {
        match self {
            ExecutionResult::Output(text) => text,
            ExecutionResult::Failed(err) => err.to_tool_output(),
        }
    }
}

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    resolver: ArgumentResolver,
    timeout: Option<Duration>,
    audit: Option<AuditLog>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            resolver: ArgumentResolver::new(),
            timeout: None,
            audit: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute `tool_name` for `subquery`, never failing.
    pub async fn execute(
        &self,
        tool_name: &str,
        raw_args: &[Value],
        ctx: &CallerContext,
        subquery: &str,
    ) -> ExecutionResult {
        let span = tracing::info_span!("tool", tool = %tool_name.trim());
        match self
            .try_execute(tool_name, raw_args, ctx)
            .instrument(span)
            .await
        {
            Ok(output) => ExecutionResult::Output(output),
            Err(e) => {
                tracing::warn!(
                    tool = %tool_name.trim(),
                    error = %e,
                    kind = ?e.kind(),
                    "Tool call failed"
                );
                ExecutionResult::Failed(StructuredError::new(
                    failure_reasoning(tool_name.trim(), &e),
                    subquery,
                    &e,
                ))
            }
        }
    }

    pub async fn try_execute(
        &self,
        tool_name: &str,
        raw_args: &[Value],
        ctx: &CallerContext,
    ) -> Result<String> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::ToolNotFound(tool_name.trim().to_string()))?;

        let args = self.resolver.resolve(tool, raw_args, ctx)?;
        let resolved = args.values().to_vec();
        let handler = tool.handler();

        tracing::info!(tool = %tool.name, args = resolved.len(), "Calling tool");
        if let Some(audit) = &self.audit {
            audit.tool_call_start(&tool.name, &resolved).await;
        }

        let started = Instant::now();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, handler.call(args)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    tool: tool.name.clone(),
                    secs: limit.as_secs(),
                }),
            },
            None => handler.call(args).await,
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            tool = %tool.name,
            duration_ms,
            ok = result.is_ok(),
            "Tool call finished"
        );
        if let Some(audit) = &self.audit {
            let logged = match &result {
                Ok(output) => Ok(output.as_str()),
                Err(e) => Err(e.to_string()),
            };
            audit
                .tool_call_complete(&tool.name, &resolved, logged, duration_ms)
                .await;
        }

        result
    }
}

fn failure_reasoning(tool: &str, error: &Error) -> String {
    match (error, error.kind()) {
        (Error::ToolNotFound(_), _) => format!("Tool {} is not available", tool),
        (_, ErrorKind::Resolution) => format!("Could not resolve arguments for {}", tool),
        (_, ErrorKind::CallerContext) => format!("{} requires a connected wallet", tool),
        _ => format!("Failed to execute tool {}", tool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerStatus;
    use crate::testing::{call_log, RecordingTool};
    use crate::tools::{handler_fn, ParamType, ParameterSpec, ToolArgs};
    use futures::FutureExt;
    use serde_json::json;

    fn executor_with(registry: ToolRegistry) -> ToolExecutor {
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let executor = executor_with(ToolRegistry::new());
        let result = executor
            .execute("get_price", &[], &CallerContext::anonymous(), "price of ETH")
            .await;

        let ExecutionResult::Failed(err) = result else {
            panic!("expected failure");
        };
        assert_eq!(err.status, AnswerStatus::Failure);
        assert_eq!(err.query, "price of ETH");
        assert!(err.errors[0].contains("not found"));
    }

    #[tokio::test]
    async fn handler_errors_keep_original_message() {
        let log = call_log();
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "get_pool",
                "Pool info",
                vec![],
                RecordingTool::failing("get_pool", "pool 0x12 does not exist", &log),
            )
            .unwrap();

        let result = executor_with(registry)
            .execute("get_pool", &[], &CallerContext::anonymous(), "pool info")
            .await;
        assert!(result.is_failure());

        let text = result.into_text();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["status"], "failure");
        assert!(parsed[0]["errors"][0]
            .as_str()
            .unwrap()
            .ends_with("pool 0x12 does not exist"));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slow_tools_time_out() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "slow",
                "Never returns in time",
                vec![],
                handler_fn(|_args: ToolArgs| {
                    async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok::<_, Error>("late".to_string())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let executor = executor_with(registry).with_timeout(Some(Duration::from_millis(20)));
        let err = executor
            .try_execute("slow", &[], &CallerContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(err.kind(), ErrorKind::ToolExecution);
    }

    #[tokio::test]
    async fn missing_parameter_is_reported_per_subquery() {
        let log = call_log();
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "get_native_balance",
                "Balance",
                vec![ParameterSpec::required("address", ParamType::Address, "Holder")],
                RecordingTool::ok("get_native_balance", "1 ETH", &log),
            )
            .unwrap();

        let result = executor_with(registry)
            .execute(
                "get_native_balance",
                &[],
                &CallerContext::anonymous(),
                "my balance",
            )
            .await;
        let ExecutionResult::Failed(err) = result else {
            panic!("expected failure");
        };
        assert!(err.errors[0].contains("Missing required parameter: address"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn audit_log_records_successful_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = call_log();
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "get_native_balance",
                "Balance",
                vec![ParameterSpec::required("address", ParamType::Address, "Holder")],
                RecordingTool::ok("get_native_balance", "1 ETH", &log),
            )
            .unwrap();

        let executor = executor_with(registry).with_audit_log(AuditLog::new(&path));
        let result = executor
            .execute(
                " get_native_balance ",
                &[json!("0xabc")],
                &CallerContext::anonymous(),
                "balance of 0xabc",
            )
            .await;
        assert!(!result.is_failure());

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"tool_call_complete\""));
    }
}
