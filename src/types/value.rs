//! Lenient JSON field coercion
//!
//! Feeds disagree on whether numbers are JSON numbers or quoted strings
//! (`"position": "1"`), so every numeric read goes through these helpers.

use serde_json::Value;

/// Integer view of a JSON value. Floats truncate toward zero; numeric strings parse.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Float view of a JSON value.
pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// First integer found under any of `keys`.
pub fn first_int(object: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| object.get(key).and_then(to_int))
}

/// First non-null value found under any of `keys`.
pub fn first_present<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(key).filter(|v| !v.is_null()))
}

/// Display text of a scalar field; `None` for missing, null or empty values.
pub fn text(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
