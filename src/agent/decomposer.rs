//! Query decomposition

use super::prompts;
use crate::llm::{ChatMessage, CompletionService};
use crate::{Error, Result};
use serde_json::Value;

/// Split `query` into ordered, self-contained subqueries.
pub async fn decompose(
    llm: &dyn CompletionService,
    assistant_name: &str,
    query: &str,
) -> Result<Vec<String>> {
    let messages = [
        ChatMessage::system(prompts::decomposer(assistant_name)),
        ChatMessage::user(query),
    ];
    let reply = llm
        .complete(&messages)
        .await
        .map_err(|e| Error::Decomposition(e.to_string()))?;

    let subqueries = parse_subqueries(&reply, query)?;
    tracing::info!(subqueries = subqueries.len(), "Decomposed query");
    Ok(subqueries)
}

/// Interpret the decomposer reply. No repair is attempted.
pub fn parse_subqueries(reply: &str, query: &str) -> Result<Vec<String>> {
    let parsed: Value = serde_json::from_str(reply.trim())
        .map_err(|e| Error::Decomposition(format!("reply is not JSON: {}", e)))?;

    let subqueries: Vec<String> = match parsed {
        Value::String(single) => vec![single],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(Error::Decomposition(format!(
                    "expected an array of strings, found {}",
                    other
                ))),
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(Error::Decomposition(format!(
                "expected an array of strings, found {}",
                other
            )))
        }
    };

    let subqueries: Vec<String> = subqueries
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if subqueries.is_empty() {
        return Ok(vec![query.to_string()]);
    }
    Ok(subqueries)
}
