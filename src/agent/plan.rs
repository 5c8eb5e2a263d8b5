//! Subquery plans produced by the tool selector

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// What the processor does with one subquery
#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    /// The model answered from its own knowledge
    Answered { response: Value },
    /// Run these tools, in order, with these raw argument tokens
    UseTools {
        tools: Vec<String>,
        arguments: Vec<Value>,
    },
    /// The caller has to supply more information first
    NeedsInfo { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryPlan {
    pub subquery: String,
    pub self_answerable: bool,
    pub action: PlanAction,
}

/// Plan as the model writes it. Accepts both snake_case and camelCase keys.
#[derive(Debug, Default, Deserialize)]
pub struct RawSubqueryPlan {
    #[serde(default)]
    pub subquery: Option<String>,
    #[serde(default, alias = "success", alias = "selfAnswerable")]
    pub self_answerable: Option<bool>,
    #[serde(default, alias = "selectedTools")]
    pub selected_tools: Option<Value>,
    #[serde(default, alias = "toolArguments")]
    pub tool_arguments: Option<Value>,
    #[serde(default, alias = "needsAdditionalInfo")]
    pub needs_additional_info: Option<bool>,
    #[serde(default, alias = "additional_info_required", alias = "missingInfo")]
    pub missing_info: Option<Value>,
    #[serde(default, alias = "response", alias = "directResponse")]
    pub direct_response: Option<Value>,
}

impl RawSubqueryPlan {
    /// Validate that exactly one action is chosen.
    ///
    /// An empty-string response and an empty tool list count as absent.
    pub fn into_plan(self, index: usize) -> Result<SubqueryPlan> {
        let direct = self.direct_response.filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });
        let tools = string_list(self.selected_tools);
        let needs_info = self.needs_additional_info.unwrap_or(false);

        let chosen = [direct.is_some(), !tools.is_empty(), needs_info]
            .iter()
            .filter(|set| **set)
            .count();
        if chosen != 1 {
            return Err(Error::InvalidPlan {
                index,
                reason: format!(
                    "expected exactly one of response, selected_tools, needs_additional_info \
                     (response: {}, tools: {}, needs_info: {})",
                    direct.is_some(),
                    tools.len(),
                    needs_info
                ),
            });
        }

        let action = if let Some(response) = direct {
            PlanAction::Answered { response }
        } else if needs_info {
            PlanAction::NeedsInfo {
                missing: string_list(self.missing_info),
            }
        } else {
            PlanAction::UseTools {
                tools,
                arguments: value_list(self.tool_arguments),
            }
        };

        Ok(SubqueryPlan {
            subquery: self.subquery.unwrap_or_default(),
            self_answerable: self.self_answerable.unwrap_or(false),
            action,
        })
    }
}

fn string_list(value: Option<Value>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(other) => vec![other],
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn value_list(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}
