//! Type sniffing for loosely-typed argument values

use regex::Regex;
use serde_json::{Number, Value};

/// Turns a model-emitted string into the scalar it most likely denotes.
pub struct TypeSniffer {
    re_number: Regex,
    re_address: Regex,
}

impl Default for TypeSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSniffer {
    pub fn new() -> Self {
        Self {
            re_number: Regex::new(r"^-?\d+(\.\d+)?$").expect("hardcoded regex"),
            re_address: Regex::new(r"^(0x)?[a-fA-F0-9]{40,64}$").expect("hardcoded regex"),
        }
    }

    /// Numbers, booleans and hex addresses are recognised; everything else
    /// stays a string.
    ///
    /// Numbers that a JSON number cannot carry exactly (integers outside the
    /// 64-bit range, decimals beyond `f64` precision) are kept as strings. A
    /// digit-only value of address length that is not a 64-bit integer is an
    /// address. Only lowercase `true`/`false` are booleans.
    pub fn sniff(&self, raw: &str) -> Value {
        let text = raw.trim();

        if self.re_number.is_match(text) {
            if let Some(number) = parse_number(text) {
                return Value::Number(number);
            }
            if let Some(address) = self.address(text) {
                return address;
            }
            return Value::String(text.to_string());
        }

        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        self.address(text)
            .unwrap_or_else(|| Value::String(text.to_string()))
    }

    fn address(&self, text: &str) -> Option<Value> {
        if !self.re_address.is_match(text) {
            return None;
        }
        let hex = text.strip_prefix("0x").unwrap_or(text);
        Some(Value::String(format!("0x{}", hex)))
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if text.contains('.') {
        let float: f64 = text.parse().ok()?;
        let number = Number::from_f64(float)?;
        return (number.to_string() == canonical_decimal(text)).then_some(number);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<u64>().ok().map(Number::from)
}

/// `1.50` → `1.5`, `-2.00` → `-2.0`; the form `f64` display produces.
fn canonical_decimal(text: &str) -> String {
    let trimmed = text.trim_end_matches('0');
    match trimmed.strip_suffix('.') {
        Some(whole) => format!("{}.0", whole),
        None => trimmed.to_string(),
    }
}
