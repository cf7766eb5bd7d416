// Splits list-valued options on commas and newlines.
use crate::core::evaluate::evaluate;
use crate::core::value::Value;

/// Splits on every `,` or `\n`, trims each piece and drops the empty ones.
/// Order and duplicates are kept.
pub fn split(raw: &str) -> Vec<&str> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn split_evaluated(raw: &str) -> Vec<Value> {
    split(raw).into_iter().map(evaluate).collect()
}
