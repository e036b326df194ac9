//! Loose scalar coercions shared by the rules
//!
//! Submitted values arrive from form posts, so a flag may be `"1"`, `1`,
//! `true` or `"on"`, and a number may be `" 42px"`. These helpers define the
//! one coercion every rule agrees on.

use serde_json::Value;

/// Truthiness of a submitted value.
///
/// `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty arrays/maps are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Whether a stored value counts as "unset" for fallback purposes
#[inline]
pub fn is_empty(value: &Value) -> bool {
    !is_truthy(value)
}

/// Coerce to an integer.
///
/// Strings are read up to the first non-digit after an optional sign, floats
/// are truncated, and anything unreadable becomes `0`. Out-of-range input
/// saturates.
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                float_to_int(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => parse_leading_int(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

/// Coerce to a non-negative integer; negative and non-numeric input become `0`
#[inline]
pub fn to_non_negative_int(value: &Value) -> i64 {
    to_int(value).max(0)
}

/// Render a scalar as text. Maps and lists have no text form and become `""`.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds
        f.trunc() as i64
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}
