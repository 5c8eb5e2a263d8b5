//! Answer envelope shared by tool outputs and the final pipeline result
//!
//! Every tool returns a JSON-encoded single-element array of [`AnswerEntry`],
//! and the pipeline returns a [`FinalAnswer`] of the same shape. Failures are
//! normalized into [`StructuredError`], which serializes to an entry with
//! `status: "failure"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Fixed response text carried by every structured error.
pub const FAILURE_RESPONSE: &str = "Operation unsuccessful";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    #[default]
    Success,
    Failure,
}

/// The `response` field: plain text or a structured JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Text(String::new())
    }
}

impl From<&str> for ResponseBody {
    fn from(value: &str) -> Self {
        ResponseBody::Text(value.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        ResponseBody::Text(value)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ResponseBody::Text(s),
            other => ResponseBody::Json(other),
        }
    }
}

/// One element of a tool output or of the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub response: ResponseBody,
    #[serde(default)]
    pub status: AnswerStatus,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub errors: Vec<Value>,
}

/// The externally visible result of one pipeline invocation.
pub type FinalAnswer = Vec<AnswerEntry>;

impl AnswerEntry {
    pub fn success(
        reasoning: impl Into<String>,
        response: impl Into<ResponseBody>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            reasoning: reasoning.into(),
            response: response.into(),
            status: AnswerStatus::Success,
            query: query.into(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnswerStatus::Success
    }

    /// Encode as the single-element array every tool handler returns.
    pub fn to_tool_output(&self) -> String {
        serde_json::to_string(&[self]).unwrap_or_else(|e| {
            format!(
                r#"[{{"reasoning":"failed to encode tool output","response":"{FAILURE_RESPONSE}","status":"failure","query":"","errors":["{e}"]}}]"#
            )
        })
    }
}

/// The single failure shape that crosses component boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub reasoning: String,
    pub response: String,
    pub status: AnswerStatus,
    pub query: String,
    pub errors: Vec<String>,
}

impl StructuredError {
    /// Build a structured error from any displayable failure.
    ///
    /// The message is prefixed with a fresh correlation id so that the
    /// failure can be matched against the logs.
    pub fn new(
        reasoning: impl Into<String>,
        query: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        let error_id = Uuid::new_v4();
        Self {
            reasoning: reasoning.into(),
            response: FAILURE_RESPONSE.to_string(),
            status: AnswerStatus::Failure,
            query: query.into(),
            errors: vec![format!("Error ID: {error_id} - {error}")],
        }
    }

    /// The correlation id embedded in the first error message, if any.
    pub fn error_id(&self) -> Option<&str> {
        self.errors
            .first()
            .and_then(|e| e.strip_prefix("Error ID: "))
            .and_then(|rest| rest.split(" - ").next())
    }

    pub fn into_entry(self) -> AnswerEntry {
        AnswerEntry {
            reasoning: self.reasoning,
            response: ResponseBody::Text(self.response),
            status: AnswerStatus::Failure,
            query: self.query,
            errors: self.errors.into_iter().map(Value::String).collect(),
        }
    }

    /// Encode in the tool output envelope so it can be aggregated like any
    /// other tool result.
    pub fn to_tool_output(&self) -> String {
        self.clone().into_entry().to_tool_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_error_embeds_correlation_id() {
        let err = StructuredError::new("Failed to fetch price", "price of ETH", "rpc timeout");
        assert_eq!(err.status, AnswerStatus::Failure);
        assert_eq!(err.response, FAILURE_RESPONSE);

        let id = err.error_id().expect("error id");
        assert!(Uuid::parse_str(id).is_ok());
        assert!(err.errors[0].ends_with("rpc timeout"));
    }

    #[test]
    fn tool_output_is_single_element_array() {
        let entry = AnswerEntry::success(
            "Fetched balance",
            json!({"balance": "1.5", "symbol": "ETH"}),
            "balance of 0xabc",
        );
        let encoded = entry.to_tool_output();
        let parsed: Vec<AnswerEntry> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], entry);
    }

    #[test]
    fn entry_fields_default_when_missing() {
        let parsed: AnswerEntry =
            serde_json::from_value(json!({"response": "hello", "status": "failure"})).unwrap();
        assert_eq!(parsed.status, AnswerStatus::Failure);
        assert_eq!(parsed.response, ResponseBody::Text("hello".into()));
        assert!(parsed.errors.is_empty());
        assert!(parsed.query.is_empty());
    }
}
