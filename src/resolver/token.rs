//! Classification of raw argument tokens emitted by the model

use serde_json::Value;

/// Names the model uses to refer to the caller's own wallet, after
/// normalization (see [`normalize_placeholder`]).
const CALLER_PLACEHOLDERS: &[&str] = &[
    "owner_id",
    "owner_address",
    "sender_id",
    "sender_address",
    "wallet_address",
    "my_address",
    "my_wallet",
    "my_wallet_address",
    "caller_address",
    "calling_wallet_address",
    "user_address",
    "your_address",
];

/// One raw argument, as the model wrote it.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentToken {
    /// `name=value`; `raw` is the untouched text, used when `name` is not a
    /// declared parameter.
    Named {
        name: String,
        value: String,
        raw: String,
    },
    /// Reference to the caller's wallet address
    Placeholder(String),
    /// A JSON object or array that is one positional argument
    Json(Value),
    /// `{"function": ..., "args": [...]}`; `args` are spliced positionally
    Envelope { function: String, args: Vec<Value> },
    Scalar(Value),
}

impl ArgumentToken {
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::String(s) => classify_str(s),
            Value::Object(_) | Value::Array(_) => from_json(raw.clone()),
            other => ArgumentToken::Scalar(other.clone()),
        }
    }
}

fn classify_str(s: &str) -> ArgumentToken {
    let text = s.trim();

    if let Some((name, value)) = split_named(text) {
        return ArgumentToken::Named {
            name: name.to_string(),
            value: value.to_string(),
            raw: s.to_string(),
        };
    }

    if is_placeholder(text) {
        return ArgumentToken::Placeholder(text.to_string());
    }

    if text.starts_with('{') || text.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Value>(text) {
            return from_json(parsed);
        }
    }

    ArgumentToken::Scalar(Value::String(s.to_string()))
}

fn from_json(value: Value) -> ArgumentToken {
    if let Value::Object(map) = &value {
        if let (Some(Value::String(function)), Some(Value::Array(args))) =
            (map.get("function"), map.get("args"))
        {
            return ArgumentToken::Envelope {
                function: function.clone(),
                args: args.clone(),
            };
        }
    }
    ArgumentToken::Json(value)
}

/// Split `name=value` when `name` looks like an identifier.
fn split_named(text: &str) -> Option<(&str, &str)> {
    let (name, value) = text.split_once('=')?;
    let name = name.trim();
    let value = unquote(value.trim());
    let is_ident = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !is_ident || value.is_empty() {
        return None;
    }
    Some((name, value))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Lowercase, strip template wrappers (`<..>`, `{..}`, `${..}`) and a leading
/// `the_`, and map spaces and dashes to underscores.
pub fn normalize_placeholder(text: &str) -> String {
    let mut inner = text.trim();
    for (open, close) in [("${", "}"), ("{{", "}}"), ("{", "}"), ("<", ">")] {
        if let Some(stripped) = inner
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            inner = stripped.trim();
            break;
        }
    }

    let normalized: String = inner
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();

    match normalized.strip_prefix("the_") {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}

pub fn is_placeholder(text: &str) -> bool {
    CALLER_PLACEHOLDERS.contains(&normalize_placeholder(text).as_str())
}
