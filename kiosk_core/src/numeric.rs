//! Attribute coercion for loosely typed GeoJSON properties.
//!
//! Feature attributes arrive as arbitrary JSON. Ranking reads them two ways:
//! - [`parse_int`]: leading base-10 integer of the value's string form
//!   (`"12.9 ha"` → 12, `"n/a"` → NaN), used for maxima
//! - [`to_number`]: full numeric conversion (`"12.9"` → 12.9, `null` → 0,
//!   missing → NaN), used for normalization

use serde_json::Value;

/// String form of a JSON value, as a browser would print it.
fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| if v.is_null() { String::new() } else { display(v) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn parse_leading_int(s: &str) -> f64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return f64::NAN;
    }
    digits[..end]
        .parse::<f64>()
        .map(|v| sign * v)
        .unwrap_or(f64::NAN)
}

/// Leading base-10 integer of the value's string form, NaN if none.
pub fn parse_int(value: &Value) -> f64 {
    parse_leading_int(&display(value))
}

/// `parse_int`, with NaN and missing values collapsed to 0.
pub fn parse_int_or_zero(value: Option<&Value>) -> f64 {
    match value.map(parse_int) {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust also accepts "inf" / "nan" spellings; browsers do not.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric conversion of an optional attribute. Missing → NaN.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        Some(v @ Value::Array(_)) => string_to_number(&display(v)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// Truthiness of a JSON value (`0`, `""`, `null`, `false` are falsy).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_int_reads_leading_digits() {
        assert_eq!(parse_int(&json!(10)), 10.0);
        assert_eq!(parse_int(&json!(10.9)), 10.0);
        assert_eq!(parse_int(&json!(-3.5)), -3.0);
        assert_eq!(parse_int(&json!("  42 ha")), 42.0);
        assert_eq!(parse_int(&json!("+7")), 7.0);
        assert!(parse_int(&json!("n/a")).is_nan());
        assert!(parse_int(&json!(null)).is_nan());
        assert!(parse_int(&json!(true)).is_nan());
    }

    #[test]
    fn parse_int_or_zero_collapses_nan_and_missing() {
        assert_eq!(parse_int_or_zero(None), 0.0);
        assert_eq!(parse_int_or_zero(Some(&json!("abc"))), 0.0);
        assert_eq!(parse_int_or_zero(Some(&json!("-0.5"))), 0.0);
        assert_eq!(parse_int_or_zero(Some(&json!("15"))), 15.0);
    }

    #[test]
    fn to_number_follows_browser_coercion() {
        assert!(to_number(None).is_nan());
        assert_eq!(to_number(Some(&json!(null))), 0.0);
        assert_eq!(to_number(Some(&json!(true))), 1.0);
        assert_eq!(to_number(Some(&json!(" 12.5 "))), 12.5);
        assert_eq!(to_number(Some(&json!(""))), 0.0);
        assert_eq!(to_number(Some(&json!("0x10"))), 16.0);
        assert_eq!(to_number(Some(&json!("Infinity"))), f64::INFINITY);
        assert!(to_number(Some(&json!("inf"))).is_nan());
        assert!(to_number(Some(&json!("12 ha"))).is_nan());
        assert_eq!(to_number(Some(&json!([]))), 0.0);
        assert_eq!(to_number(Some(&json!([7]))), 7.0);
        assert!(to_number(Some(&json!({"a": 1}))).is_nan());
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }
}
