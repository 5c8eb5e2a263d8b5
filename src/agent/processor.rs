//! Query processing: runs the plans in order and aggregates tool output

use super::plan::{PlanAction, SubqueryPlan};
use crate::executor::ToolExecutor;
use crate::wallet::CallerContext;
use serde_json::Value;

/// Aggregate text used when no tool ran.
pub const NO_TOOLS_EXECUTED: &str = "No valid tools were executed for the query";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedQuery {
    /// Raw tool outputs, newline-joined, in execution order
    pub aggregate: String,
    pub tools_used: Vec<String>,
    /// `(subquery, response)` for plans the model answered itself
    pub direct_answers: Vec<(String, Value)>,
    /// `(subquery, missing fields)` for plans waiting on the caller
    pub missing_info: Vec<(String, Vec<String>)>,
    pub failures: usize,
}

impl ProcessedQuery {
    pub fn ran_tools(&self) -> bool {
        !self.tools_used.is_empty()
    }
}

/// Execute every tool plan strictly in order.
///
/// Each tool finishes before the next one is resolved, so later subqueries
/// observe the on-chain effects of earlier ones.
pub async fn process(
    executor: &ToolExecutor,
    plans: &[SubqueryPlan],
    ctx: &CallerContext,
) -> ProcessedQuery {
    let mut processed = ProcessedQuery::default();
    let mut outputs = Vec::new();

    for plan in plans {
        match &plan.action {
            PlanAction::Answered { response } => {
                processed
                    .direct_answers
                    .push((plan.subquery.clone(), response.clone()));
            }
            PlanAction::NeedsInfo { missing } => {
                tracing::info!(
                    subquery = %plan.subquery,
                    missing = ?missing,
                    "Subquery needs more information"
                );
                processed
                    .missing_info
                    .push((plan.subquery.clone(), missing.clone()));
            }
            PlanAction::UseTools { tools, arguments } => {
                for (i, tool) in tools.iter().enumerate() {
                    let args = arguments_for(tools.len(), i, arguments);
                    let result = executor.execute(tool, args, ctx, &plan.subquery).await;
                    if result.is_failure() {
                        processed.failures += 1;
                    }
                    processed.tools_used.push(tool.trim().to_string());
                    outputs.push(result.into_text());
                }
            }
        }
    }

    processed.aggregate = if outputs.is_empty() {
        NO_TOOLS_EXECUTED.to_string()
    } else {
        outputs.join("\n")
    };
    processed
}

/// Argument list for the `index`-th of `tool_count` tools.
///
/// An array holding one array per tool is split across the tools; anything
/// else is shared by every tool in the plan.
fn arguments_for(tool_count: usize, index: usize, arguments: &[Value]) -> &[Value] {
    let per_tool = tool_count > 1
        && arguments.len() == tool_count
        && arguments.iter().all(Value::is_array);
    if !per_tool {
        return arguments;
    }
    arguments[index]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{call_log, RecordingTool};
    use crate::tools::{ParamType, ParameterSpec, ToolRegistry};
    use serde_json::json;
    use std::sync::Arc;

    fn plan(subquery: &str, action: PlanAction) -> SubqueryPlan {
        SubqueryPlan {
            subquery: subquery.to_string(),
            self_answerable: false,
            action,
        }
    }

    fn executor(log: &crate::testing::CallLog) -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        for name in ["first", "second"] {
            registry
                .register(
                    name,
                    "test tool",
                    vec![ParameterSpec::optional("value", ParamType::String, "Anything")],
                    RecordingTool::ok(name, format!("{} output", name), log),
                )
                .unwrap();
        }
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn runs_plans_in_order_and_joins_outputs() {
        let log = call_log();
        let executor = executor(&log);
        let plans = [
            plan(
                "step one",
                PlanAction::UseTools {
                    tools: vec!["first".into()],
                    arguments: vec![json!("a")],
                },
            ),
            plan(
                "step two",
                PlanAction::UseTools {
                    tools: vec!["second".into()],
                    arguments: vec![json!("b")],
                },
            ),
        ];

        let processed = process(&executor, &plans, &CallerContext::anonymous()).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls[0], ("first".to_string(), vec![json!("a")]));
        assert_eq!(calls[1], ("second".to_string(), vec![json!("b")]));

        let lines: Vec<&str> = processed.aggregate.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first output"));
        assert!(lines[1].contains("second output"));
        assert_eq!(processed.tools_used, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn multi_tool_plans_split_per_tool_arguments() {
        let log = call_log();
        let executor = executor(&log);
        let plans = [plan(
            "both",
            PlanAction::UseTools {
                tools: vec!["first".into(), "second".into()],
                arguments: vec![json!(["x"]), json!(["y"])],
            },
        )];

        process(&executor, &plans, &CallerContext::anonymous()).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls[0].1, vec![json!("x")]);
        assert_eq!(calls[1].1, vec![json!("y")]);
    }

    #[tokio::test]
    async fn answered_and_needs_info_plans_run_nothing() {
        let log = call_log();
        let executor = executor(&log);
        let plans = [
            plan(
                "what is gas?",
                PlanAction::Answered {
                    response: json!("Gas is the fee for computation."),
                },
            ),
            plan(
                "send tokens",
                PlanAction::NeedsInfo {
                    missing: vec!["recipient".into()],
                },
            ),
        ];

        let processed = process(&executor, &plans, &CallerContext::anonymous()).await;
        assert_eq!(processed.aggregate, NO_TOOLS_EXECUTED);
        assert!(!processed.ran_tools());
        assert_eq!(processed.direct_answers.len(), 1);
        assert_eq!(processed.missing_info[0].1, vec!["recipient"]);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_is_folded_into_aggregate() {
        let log = call_log();
        let executor = executor(&log);
        let plans = [plan(
            "price",
            PlanAction::UseTools {
                tools: vec!["get_price".into()],
                arguments: vec![],
            },
        )];

        let processed = process(&executor, &plans, &CallerContext::anonymous()).await;
        assert_eq!(processed.failures, 1);
        let parsed: Value = serde_json::from_str(&processed.aggregate).unwrap();
        assert!(parsed[0]["errors"][0].as_str().unwrap().contains("not found"));
    }
}
