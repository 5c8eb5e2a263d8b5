//! The query pipeline
//!
//! decompose → select tools → process (execute) → synthesize
//!
//! The registry and completion service are shared across requests; the
//! caller context is supplied per request.

pub mod decomposer;
pub mod plan;
pub mod processor;
pub mod prompts;
pub mod selector;
pub mod synthesizer;

pub use plan::{PlanAction, SubqueryPlan};
pub use processor::{ProcessedQuery, NO_TOOLS_EXECUTED};

use crate::answer::{AnswerEntry, FinalAnswer, StructuredError};
use crate::audit::{AuditLog, AuditedCompletion};
use crate::config::AgentSettings;
use crate::executor::ToolExecutor;
use crate::llm::CompletionService;
use crate::tools::ToolRegistry;
use crate::wallet::CallerContext;
use selector::SelectionRequest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a query to process.";

pub struct Agent {
    settings: AgentSettings,
    llm: Arc<dyn CompletionService>,
    executor: ToolExecutor,
}

impl Agent {
    /// Build an agent. The registry is frozen from here on.
    pub fn new(
        settings: AgentSettings,
        llm: Arc<dyn CompletionService>,
        registry: ToolRegistry,
    ) -> Self {
        let mut executor = ToolExecutor::new(Arc::new(registry))
            .with_timeout(settings.tool_timeout_secs.map(Duration::from_secs));

        let llm = match &settings.audit_log_path {
            Some(path) => {
                tracing::info!(path = %path, "Audit logging enabled");
                let audit = AuditLog::new(path);
                executor = executor.with_audit_log(audit.clone());
                Arc::new(AuditedCompletion::new(llm, audit)) as Arc<dyn CompletionService>
            }
            None => llm,
        };

        Self {
            settings,
            llm,
            executor,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Answer one user query on behalf of `ctx`.
    ///
    /// Always returns an answer; failures are reported inside it.
    pub async fn process_user_query_pipeline(
        &self,
        query: &str,
        ctx: &CallerContext,
    ) -> FinalAnswer {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %request_id);
        self.run_pipeline(query, ctx).instrument(span).await
    }

    async fn run_pipeline(&self, query: &str, ctx: &CallerContext) -> FinalAnswer {
        let query = query.trim();
        if query.is_empty() {
            return vec![StructuredError::new("Empty query", query, EMPTY_QUERY_MESSAGE).into_entry()];
        }
        if query.eq_ignore_ascii_case("ping") {
            return vec![ping_entry(ctx)];
        }

        tracing::info!(query = %query, "Processing query");
        let name = self.settings.assistant_name.as_str();

        let subqueries = match decomposer::decompose(self.llm.as_ref(), name, query).await {
            Ok(subqueries) => subqueries,
            Err(e) => {
                tracing::error!(error = %e, "Decomposition failed");
                return vec![StructuredError::new("decomposition failed", query, &e).into_entry()];
            }
        };

        let caller_address = ctx.address();
        let request = SelectionRequest {
            assistant_name: name,
            registry: self.executor.registry(),
            default_network: self.settings.default_network,
            caller_address: caller_address.as_deref(),
        };
        let plans = match selector::select_tools(self.llm.as_ref(), &request, &subqueries).await {
            Ok(plans) => plans,
            Err(e) => {
                tracing::error!(error = %e, "Tool selection failed");
                return vec![StructuredError::new("tool selection failed", query, &e).into_entry()];
            }
        };

        let processed = processor::process(&self.executor, &plans, ctx).await;
        tracing::info!(
            tools = processed.tools_used.len(),
            failures = processed.failures,
            "Processed subqueries"
        );

        let needs_info = processed
            .missing_info
            .iter()
            .map(|(subquery, missing)| needs_info_entry(subquery, missing));

        if !processed.ran_tools()
            && processed.direct_answers.is_empty()
            && !processed.missing_info.is_empty()
        {
            return needs_info.collect();
        }

        let mut answer =
            synthesizer::synthesize(self.llm.as_ref(), name, query, &processed).await;
        answer.extend(needs_info);
        answer
    }
}

fn ping_entry(ctx: &CallerContext) -> AnswerEntry {
    AnswerEntry::success(
        "Connection check",
        json!({
            "message": "Connection successful",
            "type": "ping",
            "address": ctx.address(),
        }),
        "ping",
    )
}

fn needs_info_entry(subquery: &str, missing: &[String]) -> AnswerEntry {
    let response = if missing.is_empty() {
        "Please provide more details so I can complete this request.".to_string()
    } else {
        format!("Please provide: {}", missing.join(", "))
    };
    AnswerEntry::success("Additional information is required", response, subquery)
}
