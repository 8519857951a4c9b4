//! Tolerant numeric coercion for observation cells.
//!
//! Upstream rows arrive as loosely typed JSON or CSV cells: numbers,
//! numeric strings, percent strings, blanks and the occasional `"NA"`.
//! Everything funnels through here so that the rest of the crate only
//! ever sees finite `f64`s.

use serde_json::Value;

/// Coerce a JSON cell to a finite number.
///
/// Numbers pass through when finite, strings go through [`coerce_str`],
/// and everything else (null, booleans, arrays, objects) is `None`.
pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_str(s),
        _ => None,
    }
}

/// Coerce a string cell to a finite number.
///
/// Surrounding whitespace and a single trailing `%` are ignored, so
/// `" 42.5% "` yields `42.5`. Blank strings are `None` rather than zero.
pub fn coerce_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a cell to an integral time bucket (e.g. a trial month).
///
/// Accepts `6`, `6.0` and `"6"`; rejects `6.5`.
pub fn coerce_bucket(value: &Value) -> Option<i64> {
    let v = coerce_value(value)?;
    if v.fract() != 0.0 || v.abs() > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Render a subject identifier cell as a string.
///
/// Ids are compared textually, so `1` and `"1"` name the same subject.
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
