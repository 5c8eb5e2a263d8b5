//! Response synthesis: turns aggregated tool output into the final answer

use super::processor::ProcessedQuery;
use super::prompts;
use crate::answer::{AnswerEntry, AnswerStatus, FinalAnswer, ResponseBody, StructuredError};
use crate::json_repair;
use crate::llm::{ChatMessage, CompletionService};
use crate::{Error, Result};
use serde_json::Value;

const PARSE_FAILURE_REASONING: &str = "Error parsing the response from the agent.";
const PARSE_FAILURE_RESPONSE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Ask the model for the final answer. Never fails: any problem becomes a
/// single failure entry.
pub async fn synthesize(
    llm: &dyn CompletionService,
    assistant_name: &str,
    query: &str,
    processed: &ProcessedQuery,
) -> FinalAnswer {
    let prompt = prompts::synthesizer(
        assistant_name,
        query,
        &processed.aggregate,
        &processed.tools_used,
        &processed.direct_answers,
    );
    let messages = [ChatMessage::system(prompt), ChatMessage::user(query)];

    let reply = match llm.complete(&messages).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Synthesis call failed");
            return vec![parse_failure(query, &e)];
        }
    };

    match parse_final_answer(&reply, query) {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %e, "Could not parse synthesized answer");
            vec![parse_failure(query, &e)]
        }
    }
}

/// Parse a synthesizer reply through the repair chain.
///
/// A bare object is accepted as a one-entry answer; entries with an empty
/// `query` inherit the user query.
pub fn parse_final_answer(reply: &str, query: &str) -> Result<FinalAnswer> {
    let (value, strategy) = json_repair::parse_json(reply)?;
    tracing::debug!(strategy = ?strategy, "Parsed synthesized answer");

    let value = match value {
        object @ Value::Object(_) => Value::Array(vec![object]),
        other => other,
    };
    let mut answer: FinalAnswer =
        serde_json::from_value(value).map_err(|e| Error::AnswerParse(e.to_string()))?;
    if answer.is_empty() {
        return Err(Error::AnswerParse("answer array is empty".to_string()));
    }

    for entry in &mut answer {
        if entry.query.trim().is_empty() {
            entry.query = query.to_string();
        }
    }
    Ok(answer)
}

fn parse_failure(query: &str, error: &Error) -> AnswerEntry {
    let structured = StructuredError::new(PARSE_FAILURE_REASONING, query, error);
    AnswerEntry {
        reasoning: structured.reasoning,
        response: ResponseBody::Text(PARSE_FAILURE_RESPONSE.to_string()),
        status: AnswerStatus::Failure,
        query: structured.query,
        errors: structured.errors.into_iter().map(Value::String).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedCompletion;
    use serde_json::json;

    #[test]
    fn tool_envelope_round_trips_with_status() {
        let failed = StructuredError::new("Failed to execute tool send_native", "send 1 ETH", "insufficient funds");
        let envelope = failed.to_tool_output();

        let answer = parse_final_answer(&envelope, "send 1 ETH").unwrap();
        assert_eq!(answer.len(), 1);
        assert_eq!(answer[0].status, AnswerStatus::Failure);
        assert!(answer[0].errors[0].as_str().unwrap().ends_with("insufficient funds"));
    }

    #[test]
    fn empty_query_inherits_user_query() {
        let reply = json!([{"reasoning": "r", "response": {"balance": "1.0"}, "status": "success", "query": "", "errors": []}]);
        let answer = parse_final_answer(&reply.to_string(), "my balance").unwrap();
        assert_eq!(answer[0].query, "my balance");
        assert_eq!(answer[0].response, ResponseBody::Json(json!({"balance": "1.0"})));
    }

    #[test]
    fn bare_object_is_accepted() {
        let answer =
            parse_final_answer(r#"{"reasoning":"r","response":"ok","status":"success"}"#, "q").unwrap();
        assert_eq!(answer.len(), 1);
        assert!(answer[0].is_success());
    }

    #[tokio::test]
    async fn unparseable_reply_becomes_failure_entry() {
        let llm = ScriptedCompletion::new(["I am not JSON at all"]);
        let answer = synthesize(&llm, "Sage", "my balance", &ProcessedQuery::default()).await;

        assert_eq!(answer.len(), 1);
        assert_eq!(answer[0].status, AnswerStatus::Failure);
        assert_eq!(answer[0].reasoning, PARSE_FAILURE_REASONING);
        assert_eq!(answer[0].response, ResponseBody::Text(PARSE_FAILURE_RESPONSE.into()));
        assert!(answer[0].errors[0].as_str().unwrap().starts_with("Error ID: "));
    }

    #[tokio::test]
    async fn model_failure_becomes_failure_entry() {
        let llm = ScriptedCompletion::new(Vec::<String>::new()).then_fail("upstream 503");
        let answer = synthesize(&llm, "Sage", "q", &ProcessedQuery::default()).await;
        assert_eq!(answer[0].status, AnswerStatus::Failure);
        assert!(answer[0].errors[0].as_str().unwrap().contains("upstream 503"));
    }
}
