//! Single-quoted host literals
//!
//! Every mocked return value goes through [`render`]: the value is encoded
//! as JSON, then escaped so it survives inside `'...'`. [`decode_literal`]
//! is the inverse applied by the registered `from_json` hook.

use serde_json::Value;

/// Escape text for a single-quoted literal
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            other => quoted.push(other),
        }
    }
    quoted
}

/// Undo [`quote`]; a backslash escapes the character after it
pub fn unquote(literal: &str) -> String {
    let mut text = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => text.push(escaped),
                None => text.push('\\'),
            }
        } else {
            text.push(c);
        }
    }
    text
}

/// JSON text of `value`, quoted for embedding
pub fn render(value: &Value) -> String {
    quote(&value.to_string())
}

pub fn decode_literal(literal: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&unquote(literal))
}
