// src/utils/row.rs

//! Tolerant access to loosely-typed database rows.
//!
//! Rows arrive as JSON objects keyed by column name. Columns may be missing
//! entirely depending on the deployment's schema, so every read goes through
//! one of the helpers below instead of indexing the map directly.

use serde_json::{Map, Value};

/// One result row: column name to value.
pub type Row = Map<String, Value>;

/// A runtime type check for a single column value.
pub trait FieldType: Sized {
    /// Returns `Some` only if `value` has exactly this type.
    fn from_field(value: &Value) -> Option<Self>;
}

impl FieldType for bool {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldType for String {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FieldType for i64 {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FieldType for f64 {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

/// Reads `name` as `T`, or `None` if absent, null or of another type.
pub fn field<T: FieldType>(row: &Row, name: &str) -> Option<T> {
    row.get(name).and_then(T::from_field)
}

/// Reads `name` as `T`, returning `default` if absent, null or of another type.
pub fn field_or<T: FieldType>(row: &Row, name: &str, default: T) -> T {
    field(row, name).unwrap_or(default)
}

/// True if the column exists and is not null.
pub fn is_present(row: &Row, name: &str) -> bool {
    row.get(name).is_some_and(|v| !v.is_null())
}

/// JavaScript truthiness of a value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `String(value)` as JavaScript would render it.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                n.as_f64().map(format_js_number).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `Number(value)` as JavaScript would coerce it.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_js_number(s),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Numeric coercion truncated toward zero. `None` when not finite.
pub fn to_integer(value: &Value) -> Option<i64> {
    let n = to_number(value);
    n.is_finite().then(|| n.trunc() as i64)
}

/// Parses a string with the rules of JavaScript's `Number(string)`.
pub fn parse_js_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&s[2..], radix);
    }

    // Rust also accepts "inf" and "nan", JavaScript does not.
    let is_decimal_literal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal_literal {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Digits after a `0x`/`0o`/`0b` prefix. No sign allowed, no u64 overflow.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

fn format_js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        format_js_exponent(n)
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// `1e21` -> `1e+21`, `1.5e-7` -> `1.5e-7`.
fn format_js_exponent(n: f64) -> String {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
