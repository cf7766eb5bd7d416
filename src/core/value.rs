// Typed values produced by evaluating raw option strings.
use std::fmt;

use serde_json::{Map, Value as JsonValue};

/// A constant produced by the literal evaluator or the keyword fallback.
///
/// Tuples evaluate to `List`. Mappings keep their source order; a key written
/// twice keeps its first position and takes the later value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats; booleans do not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Looks up a mapping entry using key equality (so `1`, `1.0` and `True`
    /// address the same entry).
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.key_eq(key))
            .map(|(_, v)| v)
    }

    /// Mapping-key equality: `True`, `1` and `1.0` are the same key, integers
    /// compare exactly, and tuples compare element-wise.
    pub(crate) fn key_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Float(f), other) | (other, Self::Float(f)) => {
                other.integer().is_some_and(|n| int_eq_float(n, *f))
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key_eq(y))
            }
            _ => match (self.integer(), other.integer()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => self == other,
                _ => false,
            },
        }
    }

    fn integer(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts to JSON. Non-string mapping keys are rendered with `Display`;
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::None => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::from(*n),
            Self::Float(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Str(s) => JsonValue::String(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(entries) => {
                let mut out = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        Self::Str(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out.insert(key, value.to_json());
                }
                JsonValue::Object(out)
            }
        }
    }
}

// Equal only when the float holds exactly this integer.
fn int_eq_float(n: i64, f: f64) -> bool {
    let widened = n as f64;
    widened == f && widened as i128 == i128::from(n)
}

/// Renders in literal syntax, so the output evaluates back to the same value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 => {
                write!(f, "{n:.1}")
            }
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Str(s) => write_quoted(f, s),
            Self::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write_key(f, key)?;
                    write!(f, ": {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// Sequences used as keys came from tuples; render them that way.
fn write_key(f: &mut fmt::Formatter<'_>, key: &Value) -> fmt::Result {
    let Value::List(items) = key else {
        return write!(f, "{key}");
    };
    f.write_str("(")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write_key(f, item)?;
    }
    if items.len() == 1 {
        f.write_str(",")?;
    }
    f.write_str(")")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use serde_json::json;

    #[test]
    fn display_uses_literal_syntax() {
        let value = Value::Map(vec![
            (Value::Int(1), Value::Int(12)),
            (Value::from("bye"), Value::List(vec![Value::from("a"), Value::Float(2.0)])),
            (Value::from("it's"), Value::None),
        ]);
        assert_eq!(
            value.to_string(),
            r"{1: 12, 'bye': ['a', 2.0], 'it\'s': None}"
        );
        assert_eq!(Value::Float(4.2).to_string(), "4.2");
        let tuple_keys = Value::Map(vec![
            (Value::List(vec![Value::Int(1), Value::Int(2)]), Value::List(vec![])),
            (Value::List(vec![Value::from("a")]), Value::None),
        ]);
        assert_eq!(tuple_keys.to_string(), "{(1, 2): [], ('a',): None}");
        assert_eq!(Value::Bool(false).to_string(), "False");
    }

    #[test]
    fn json_conversion_stringifies_keys() {
        let value = Value::Map(vec![
            (Value::Int(5), Value::from("hello")),
            (Value::from("n"), Value::Float(f64::NAN)),
        ]);
        assert_eq!(value.to_json(), json!({"5": "hello", "n": null}));
    }

    #[test]
    fn key_equality_crosses_numeric_types() {
        let map = Value::Map(vec![(Value::Int(1), Value::from("one"))]);
        assert_eq!(map.get(&Value::Float(1.0)), Some(&Value::from("one")));
        assert_eq!(map.get(&Value::Bool(true)), Some(&Value::from("one")));
        assert_eq!(map.get(&Value::from("1")), None);
    }

    #[test]
    fn large_integer_keys_compare_exactly() {
        let big = 9_007_199_254_740_993_i64;
        assert!(!Value::Int(big).key_eq(&Value::Int(big - 1)));
        assert!(!Value::Int(big).key_eq(&Value::Float(big as f64)));
        assert!(Value::Int(big - 1).key_eq(&Value::Float((big - 1) as f64)));
        assert!(!Value::Int(i64::MAX).key_eq(&Value::Float(i64::MAX as f64)));
        assert!(Value::List(vec![Value::Int(1), Value::from("a")])
            .key_eq(&Value::List(vec![Value::Float(1.0), Value::from("a")])));
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::None.is_none());
        assert_eq!(Value::List(vec![]).type_name(), "list");
    }
}
