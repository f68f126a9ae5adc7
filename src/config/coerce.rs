//! Loose-to-strict value conversions.
//!
//! Stored values arrive from TOML, environment variables and flags, so the
//! same setting may be a native integer in one source and a string in
//! another. An absent key coerces to the zero value without error.

use toml::Value;

use crate::config::error::CoercionError;

fn fail(key: &str, value: &Value, target: &'static str) -> CoercionError {
    CoercionError {
        key: key.to_string(),
        value: value.to_string(),
        found: value.type_str(),
        target,
    }
}

/// Interpret `value` as a boolean.
pub fn to_bool(key: &str, value: Option<&Value>) -> Result<bool, CoercionError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => parse_bool(s).ok_or_else(|| fail(key, value, "bool")),
        _ => Err(fail(key, value, "bool")),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Render `value` as a string. Arrays and tables do not coerce.
pub fn to_string(key: &str, value: Option<&Value>) -> Result<String, CoercionError> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) | Value::Table(_) => Err(fail(key, value, "string")),
    }
}

/// Interpret `value` as a signed integer. Floats truncate toward zero.
pub fn to_int(key: &str, value: Option<&Value>) -> Result<i64, CoercionError> {
    let Some(value) = value else {
        return Ok(0);
    };
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::String(s) => parse_int(s).ok_or_else(|| fail(key, value, "integer")),
        _ => Err(fail(key, value, "integer")),
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = trim_zero_decimal(s);
    let (negative, digits) = match *s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

/// `"12.000"` → `"12"`; anything else is returned as is.
fn trim_zero_decimal(s: &str) -> &str {
    match s.split_once('.') {
        Some((whole, frac)) if !whole.is_empty() && frac.chars().all(|c| c == '0') => whole,
        _ => s,
    }
}
