//! Recovery of JSON from model replies
//!
//! Models frequently return almost-JSON: stray backslashes in free text,
//! doubly escaped quotes, or an array wrapped in prose and code fences.
//! [`parse_json`] tries each [`ParseStrategy`] in order and reports which
//! one succeeded.

use crate::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The reply was valid JSON as is
    Direct,
    /// Valid after repairing escape sequences
    NormalizedEscapes,
    /// Valid after cutting the first well-formed `[ { ... } ]` span out of
    /// the reply
    ExtractedArray,
}

pub fn parse_json(raw: &str) -> Result<(Value, ParseStrategy)> {
    let trimmed = raw.trim();

    let direct_err = match parse_direct(trimmed) {
        Ok(value) => return Ok((value, ParseStrategy::Direct)),
        Err(e) => e,
    };

    if let Some(value) = parse_normalized(trimmed) {
        return Ok((value, ParseStrategy::NormalizedEscapes));
    }

    if let Some(span) = extract_array(trimmed) {
        if let Ok(value) = parse_direct(span) {
            return Ok((value, ParseStrategy::ExtractedArray));
        }
    }
    let repaired = normalize_escapes(trimmed);
    if let Some(span) = extract_array(&repaired) {
        if let Ok(value) = parse_direct(span) {
            return Ok((value, ParseStrategy::ExtractedArray));
        }
    }

    Err(Error::AnswerParse(direct_err.to_string()))
}

pub fn parse_direct(raw: &str) -> std::result::Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Escape repair, least invasive first: double stray backslashes, then also
/// unescape `\"` before doubling.
pub fn parse_normalized(raw: &str) -> Option<Value> {
    let repaired = normalize_escapes(raw);
    if let Ok(value) = serde_json::from_str(&repaired) {
        return Some(value);
    }
    let unescaped = normalize_escapes(&raw.replace("\\\"", "\""));
    serde_json::from_str(&unescaped).ok()
}

/// Double every backslash that does not start a valid JSON escape.
pub fn normalize_escapes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                out.push(c);
                out.push(chars[i + 1]);
                i += 2;
            }
            Some('u') if is_unicode_escape(&chars[i + 2..]) => {
                out.push(c);
                i += 1;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }
    out
}

fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(|c| c.is_ascii_hexdigit())
}

/// First span that parses as an array whose first element is an object.
///
/// Each `[` is tried in turn; a span that fails to parse is skipped, so a
/// truncated draft does not hide a later complete answer.
pub fn extract_array(raw: &str) -> Option<&str> {
    raw.match_indices('[').find_map(|(start, _)| {
        let rest = &raw[start..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) if items.first().is_some_and(Value::is_object) => {
                Some(&rest[..stream.byte_offset()])
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct() {
        let (value, strategy) = parse_json(r#"[{"status":"success"}]"#).unwrap();
        assert_eq!(strategy, ParseStrategy::Direct);
        assert_eq!(value, json!([{"status": "success"}]));
    }

    #[test]
    fn stray_backslash_is_repaired_by_normalization() {
        let raw = r#"[{"reasoning":"path C:\query\dir","response":"ok","status":"success","query":"q","errors":[]}]"#;
        assert!(parse_direct(raw).is_err());

        let (value, strategy) = parse_json(raw).unwrap();
        assert_eq!(strategy, ParseStrategy::NormalizedEscapes);
        assert_eq!(value[0]["reasoning"], r"path C:\query\dir");
    }

    #[test]
    fn valid_escapes_are_preserved() {
        let raw = r#"{"a":"line\nnext \u00e9 \"q\" \\ \/"}"#;
        assert_eq!(normalize_escapes(raw), raw);
    }

    #[test]
    fn over_escaped_quotes_are_unescaped() {
        let raw = r#"[{\"status\":\"success\",\"response\":\"done\"}]"#;
        let (value, strategy) = parse_json(raw).unwrap();
        assert_eq!(strategy, ParseStrategy::NormalizedEscapes);
        assert_eq!(value[0]["response"], "done");
    }

    #[test]
    fn array_is_extracted_from_prose() {
        let raw = "Here is the answer:\n```json\n[ {\"status\": \"success\"} ]\n```\nHope it helps.";
        let (value, strategy) = parse_json(raw).unwrap();
        assert_eq!(strategy, ParseStrategy::ExtractedArray);
        assert_eq!(value[0]["status"], "success");
    }

    #[test]
    fn first_complete_array_wins_over_later_ones() {
        let raw = r#"Draft: [ {"status": "failure"} ] and final: [ {"status": "success"} ]"#;
        let (value, strategy) = parse_json(raw).unwrap();
        assert_eq!(strategy, ParseStrategy::ExtractedArray);
        assert_eq!(value, json!([{"status": "failure"}]));
    }

    #[test]
    fn malformed_draft_is_skipped() {
        let raw = r#"Draft: [ {"status": } ] final: [ {"status": "success", "response": "[1, 2]"} ] done"#;
        let (value, _) = parse_json(raw).unwrap();
        assert_eq!(value, json!([{"status": "success", "response": "[1, 2]"}]));
        assert_eq!(
            extract_array(raw),
            Some(r#"[ {"status": "success", "response": "[1, 2]"} ]"#)
        );
    }

    #[test]
    fn arrays_of_scalars_are_not_extracted() {
        assert_eq!(extract_array("ids [1, 2] then [ {\"a\": 1} ]"), Some("[ {\"a\": 1} ]"));
        assert_eq!(extract_array("just [1, 2]"), None);
    }

    #[test]
    fn unrecoverable_reply_is_an_error() {
        let err = parse_json("I could not do that").unwrap_err();
        assert!(matches!(err, Error::AnswerParse(_)));
    }
}
