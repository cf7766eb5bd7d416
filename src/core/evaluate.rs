// Total evaluation of raw option strings: literal first, then boolean keywords,
// then the string itself.
use tracing::trace;

use crate::core::literal::parse_literal;
use crate::core::value::Value;

pub fn evaluate(raw: &str) -> Value {
    match parse_literal(raw) {
        Ok(value) => value,
        Err(err) => {
            trace!(raw, reason = err.reason(), "literal parse failed, using fallback");
            match keyword_bool(raw) {
                Some(b) => Value::Bool(b),
                None => Value::Str(raw.to_string()),
            }
        }
    }
}

/// Case-insensitive `yes`/`no`, `true`/`false`, `on`/`off`.
pub fn keyword_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "no" | "false" | "off" => Some(false),
        "yes" | "true" | "on" => Some(true),
        _ => None,
    }
}
