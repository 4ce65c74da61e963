//! Get-or-default accessors over `serde_json::Value`.
//!
//! Lookups on a missing key, a `null`, or a value of the wrong shape resolve to the
//! caller's default instead of failing. Indexing into a non-object is treated as a
//! missing key.

use serde_json::Value;

/// Read `key` as text, or `default` when absent.
///
/// Numbers and booleans are rendered as text; objects, arrays and `null` fall back.
pub fn str_or(node: &Value, key: &str, default: &str) -> String {
    opt_str(node, key).unwrap_or_else(|| default.to_string())
}

/// Read `key` as text if it holds a scalar.
pub fn opt_str(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read `key` as a float, or `default` when absent or not numeric.
///
/// Decimal strings (`"5.4"`) are accepted since some servers quote decimals.
pub fn f64_or(node: &Value, key: &str, default: f64) -> f64 {
    match node.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Borrow `key` as an array, or an empty slice.
pub fn array<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Borrow `key` if it holds an object.
pub fn object<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    node.get(key).filter(|v| v.is_object())
}
