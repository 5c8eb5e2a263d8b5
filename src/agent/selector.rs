//! Tool selection: one plan per subquery

use super::plan::{RawSubqueryPlan, SubqueryPlan};
use super::prompts;
use crate::config::Network;
use crate::json_repair;
use crate::llm::{ChatMessage, CompletionService};
use crate::tools::ToolRegistry;
use crate::{Error, Result};
use serde_json::Value;

pub struct SelectionRequest<'a> {
    pub assistant_name: &'a str,
    pub registry: &'a ToolRegistry,
    pub default_network: Network,
    pub caller_address: Option<&'a str>,
}

pub async fn select_tools(
    llm: &dyn CompletionService,
    request: &SelectionRequest<'_>,
    subqueries: &[String],
) -> Result<Vec<SubqueryPlan>> {
    let system = prompts::selector(
        request.assistant_name,
        &request.registry.catalog_json(),
        request.default_network,
        request.caller_address,
    );
    let messages = [
        ChatMessage::system(system),
        ChatMessage::user(serde_json::to_string(subqueries)?),
    ];

    let reply = llm
        .complete(&messages)
        .await
        .map_err(|e| Error::Selection(e.to_string()))?;

    let plans = parse_plans(&reply, subqueries)?;
    tracing::info!(plans = plans.len(), "Selected tools");
    Ok(plans)
}

/// Parse and validate the selector reply.
///
/// A plan with an empty `subquery` inherits the decomposed subquery at the
/// same position.
pub fn parse_plans(reply: &str, subqueries: &[String]) -> Result<Vec<SubqueryPlan>> {
    if reply.trim().is_empty() {
        return Ok(Vec::new());
    }

    let (value, strategy) =
        json_repair::parse_json(reply).map_err(|e| Error::Selection(e.to_string()))?;
    tracing::debug!(strategy = ?strategy, "Parsed selector reply");

    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(Error::Selection(format!(
                "expected an array of plans, found {}",
                other
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let raw: RawSubqueryPlan =
                serde_json::from_value(item).map_err(|e| Error::InvalidPlan {
                    index,
                    reason: e.to_string(),
                })?;
            let mut plan = raw.into_plan(index)?;
            if plan.subquery.trim().is_empty() {
                plan.subquery = subqueries.get(index).cloned().unwrap_or_default();
            }
            Ok(plan)
        })
        .collect()
}
