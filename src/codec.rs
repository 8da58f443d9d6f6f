//! JSON codec for loosely-typed payment payloads.
//!
//! Payloads are flat JSON objects whose schema is only partially known: a few
//! keys are read by the relay, everything else is passed through untouched.
//! They are kept as a `serde_json` map built with `preserve_order`, so keys
//! serialize in the order they were inserted.

use serde_json::{Map, Value};

use crate::error::AppError;

/// A JSON object with insertion-ordered keys.
pub type Record = Map<String, Value>;

/// Parse a request body into a [`Record`].
///
/// # Errors
///
/// `MalformedPayload` if the bytes are not valid JSON or the top-level value
/// is not an object.
pub fn parse(bytes: &[u8]) -> Result<Record, AppError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(AppError::MalformedPayload(format!(
            "expected a JSON object, found {}",
            kind(&other)
        ))),
        Err(e) => Err(AppError::MalformedPayload(e.to_string())),
    }
}

/// Serialize a [`Record`] to compact JSON text.
pub fn serialize(record: &Record) -> String {
    Value::Object(record.clone()).to_string()
}

/// A key counts as present when it exists and is not `null`.
pub fn is_present(record: &Record, key: &str) -> bool {
    record.get(key).is_some_and(|value| !value.is_null())
}

/// Read a field as text.
///
/// Strings are returned verbatim, other scalars in their JSON spelling
/// (`5000`, `true`). `null` and missing keys yield `None`.
pub fn text(record: &Record, key: &str) -> Option<String> {
    record.get(key).and_then(value_text)
}

/// Read a field as text, falling back to `default`.
pub fn text_or(record: &Record, key: &str, default: &str) -> String {
    text(record, key).unwrap_or_else(|| default.to_string())
}

pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Interpret a value as a whole number of minor currency units.
///
/// Accepts JSON integers, floats without a fractional part, and strings holding
/// either. Anything else is `None`.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }
}

/// Interpret a value as a decimal number.
pub fn decimal(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_values_and_delimiters_inside_strings() {
        let record = parse(
            br#"{"orderId":"o:1,2","meta":{"coupon":true},"items":[1,2],"note":"say \"hi\""}"#,
        )
        .unwrap();

        assert_eq!(text(&record, "orderId").as_deref(), Some("o:1,2"));
        assert_eq!(record["meta"]["coupon"], json!(true));
        assert_eq!(record["items"], json!([1, 2]));
        assert_eq!(text(&record, "note").as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn rejects_invalid_json_and_non_objects() {
        assert!(matches!(parse(b"{\"userId\":"), Err(AppError::MalformedPayload(_))));
        assert!(matches!(parse(b"[1,2,3]"), Err(AppError::MalformedPayload(_))));
        assert!(matches!(parse(b""), Err(AppError::MalformedPayload(_))));
    }

    #[test]
    fn serialize_keeps_insertion_order() {
        let mut record = Record::new();
        record.insert("zeta".into(), json!("last-alphabetically"));
        record.insert("amount".into(), json!(5000));
        record.insert("approved".into(), json!(false));

        assert_eq!(
            serialize(&record),
            r#"{"zeta":"last-alphabetically","amount":5000,"approved":false}"#
        );
    }

    #[test]
    fn serialize_escapes_strings() {
        let mut record = Record::new();
        record.insert("message".into(), json!("line \"one\"\nline two"));

        let text = serialize(&record);
        assert_eq!(text, r#"{"message":"line \"one\"\nline two"}"#);
        assert_eq!(parse(text.as_bytes()).unwrap(), record);
    }

    #[test]
    fn null_counts_as_absent() {
        let record = parse(br#"{"paymentKey":null,"orderId":"o1"}"#).unwrap();

        assert!(!is_present(&record, "paymentKey"));
        assert!(is_present(&record, "orderId"));
        assert_eq!(text_or(&record, "paymentKey", ""), "");
    }

    #[test]
    fn scalar_text_uses_json_spelling() {
        let record = parse(br#"{"amount":5000,"flag":true,"price":12.5}"#).unwrap();

        assert_eq!(text(&record, "amount").as_deref(), Some("5000"));
        assert_eq!(text(&record, "flag").as_deref(), Some("true"));
        assert_eq!(text(&record, "price").as_deref(), Some("12.5"));
    }

    #[test]
    fn integer_accepts_numbers_and_numeric_strings() {
        assert_eq!(integer(&json!(250)), Some(250));
        assert_eq!(integer(&json!("5000")), Some(5000));
        assert_eq!(integer(&json!(" 42 ")), Some(42));
        assert_eq!(integer(&json!(300.0)), Some(300));
        assert_eq!(integer(&json!("300.0")), Some(300));
    }

    #[test]
    fn integer_rejects_fractions_and_text() {
        assert_eq!(integer(&json!(299.5)), None);
        assert_eq!(integer(&json!("abc")), None);
        assert_eq!(integer(&json!(true)), None);
        assert_eq!(integer(&Value::Null), None);
    }

    #[test]
    fn decimal_parses_strings() {
        assert_eq!(decimal(&json!("12.5")), Some(12.5));
        assert_eq!(decimal(&json!(7)), Some(7.0));
        assert_eq!(decimal(&json!("NaN")), None);
        assert_eq!(decimal(&json!([1])), None);
    }
}
