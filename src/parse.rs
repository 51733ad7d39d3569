//! Lenient decoding of server fields with uncertain shape.
//!
//! Several backend fields (`learning_path`, `progress`, `detailed_progress`)
//! arrive either as native JSON or as a JSON document encoded in a string,
//! and may be missing or `null`. Everything that enters the model from the
//! wire goes through [`parse_or_default`]. Single fields inside otherwise
//! well-formed records use [`lenient`] and [`lenient_text`] so one odd value
//! does not discard the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a value that is either native JSON or a string holding JSON
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    match value {
        Value::String(encoded) => serde_json::from_str(encoded),
        other => serde::Deserialize::deserialize(other),
    }
}

/// Decode `value`, falling back to `T::default()` when it is absent, null,
/// empty, or malformed. Malformed input is logged under `field`.
pub fn parse_or_default<T>(value: Option<&Value>, field: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let value = match value {
        None | Some(Value::Null) => return T::default(),
        Some(Value::String(s)) if s.trim().is_empty() => return T::default(),
        Some(value) => value,
    };

    match decode(value) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(field = %field, error = %e, "Malformed server field, using default");
            T::default()
        }
    }
}

/// Field deserializer: take the value as typed, else a string holding it,
/// else `T::default()`. Never fails.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

/// Field deserializer for free text that the server sometimes sends as a
/// number or bool. Objects and arrays become `None`.
pub fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn coerce<T: DeserializeOwned + Default>(value: &Value) -> T {
    if let Ok(parsed) = serde::Deserialize::deserialize(value) {
        return parsed;
    }
    if let Value::String(encoded) = value {
        if let Ok(parsed) = serde_json::from_str(encoded) {
            return parsed;
        }
    }
    tracing::debug!(value = %value, "Unexpected field value, using default");
    T::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_native_and_encoded_values_agree() {
        let native: Vec<u32> = parse_or_default(Some(&json!([1, 2, 3])), "ids");
        let encoded: Vec<u32> = parse_or_default(Some(&json!("[1, 2, 3]")), "ids");
        assert_eq!(native, vec![1, 2, 3]);
        assert_eq!(native, encoded);
    }

    #[test]
    fn test_missing_null_and_empty_default() {
        let missing: Vec<u32> = parse_or_default(None, "ids");
        let null: Vec<u32> = parse_or_default(Some(&Value::Null), "ids");
        let empty: HashMap<String, bool> = parse_or_default(Some(&json!("")), "progress");
        assert!(missing.is_empty());
        assert!(null.is_empty());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_malformed_defaults() {
        let bad_json: Vec<u32> = parse_or_default(Some(&json!("[1, 2")), "ids");
        let wrong_shape: Vec<u32> = parse_or_default(Some(&json!({"a": 1})), "ids");
        assert!(bad_json.is_empty());
        assert!(wrong_shape.is_empty());
    }

    #[test]
    fn test_decode_surfaces_errors() {
        assert!(decode::<Vec<u32>>(&json!("nope")).is_err());
        assert_eq!(decode::<u32>(&json!("7")).unwrap(), 7);
    }

    #[derive(Debug, Default, Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "lenient")]
        score: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        minutes: Option<u32>,
        #[serde(default, deserialize_with = "lenient_text")]
        label: Option<String>,
    }

    #[test]
    fn test_lenient_fields_fall_back_one_at_a_time() {
        let record: Record = serde_json::from_value(json!({
            "score": "82.5",
            "minutes": 12.5,
            "label": 5
        }))
        .unwrap();
        assert_eq!(record.score, Some(82.5));
        assert_eq!(record.minutes, None);
        assert_eq!(record.label.as_deref(), Some("5"));

        let empty: Record = serde_json::from_value(json!({"label": {"nested": true}})).unwrap();
        assert_eq!(empty.score, None);
        assert_eq!(empty.label, None);
    }
}
