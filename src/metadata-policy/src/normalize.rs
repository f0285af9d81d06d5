//! Value normalization between raw JSON values and normalized string sequences
//!
//! Policy and metadata values arrive as loosely-typed JSON: a parameter that
//! is declared as an array may be given as a bare scalar, and a scalar may be
//! wrapped in a one-element array. Every value is reduced to an ordered
//! sequence of strings before an operator looks at it.

use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::{Number, Value};

/// Normalize a raw value to the string sequence of its declared type
///
/// `null` and `[]` normalize to the empty sequence. A bare scalar and a
/// one-element array are equivalent for every type.
pub fn normalize(value: &Value, value_type: ValueType) -> Result<Vec<String>> {
    let element_type = value_type.element_type();
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            if !value_type.is_array() && items.len() > 1 {
                return Err(PolicyError::Translation(format!(
                    "Expected a single {} value, found {} values",
                    value_type,
                    items.len()
                )));
            }
            items
                .iter()
                .map(|item| normalize_scalar(item, element_type))
                .collect()
        }
        scalar => Ok(vec![normalize_scalar(scalar, element_type)?]),
    }
}

/// Convert a normalized sequence back into a typed JSON value
///
/// Scalar types yield `null` for an empty sequence.
pub fn denormalize(values: &[String], value_type: ValueType) -> Result<Value> {
    let element_type = value_type.element_type();
    if value_type.is_array() {
        let items = values
            .iter()
            .map(|v| denormalize_scalar(v, element_type))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }

    match values {
        [] => Ok(Value::Null),
        [single] => denormalize_scalar(single, element_type),
        _ => Err(PolicyError::Translation(format!(
            "Cannot represent {} values as a single {} value",
            values.len(),
            value_type
        ))),
    }
}

fn normalize_scalar(item: &Value, element_type: ValueType) -> Result<String> {
    match (element_type, item) {
        (ValueType::String, Value::String(s)) => Ok(s.clone()),
        (ValueType::Integer, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                Err(type_mismatch(item, element_type))
            }
        }
        (ValueType::Integer, Value::String(s)) => parse_integer(s)
            .map(|n| n.to_string())
            .ok_or_else(|| type_mismatch(item, element_type)),
        (ValueType::Boolean, Value::Bool(b)) => Ok(b.to_string()),
        (ValueType::Boolean, Value::String(s)) if s == "true" || s == "false" => Ok(s.clone()),
        _ => Err(type_mismatch(item, element_type)),
    }
}

fn denormalize_scalar(value: &str, element_type: ValueType) -> Result<Value> {
    match element_type {
        ValueType::Integer => parse_integer(value)
            .map(Value::Number)
            .ok_or_else(|| PolicyError::Translation(format!("'{}' is not an integer", value))),
        ValueType::Boolean => value
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| PolicyError::Translation(format!("'{}' is not a boolean", value))),
        _ => Ok(Value::String(value.to_string())),
    }
}

/// Integers span the combined `i64` and `u64` range, as JSON numbers do
fn parse_integer(value: &str) -> Option<Number> {
    value
        .parse::<i64>()
        .map(Number::from)
        .or_else(|_| value.parse::<u64>().map(Number::from))
        .ok()
}

fn type_mismatch(item: &Value, element_type: ValueType) -> PolicyError {
    PolicyError::Translation(format!("Value {} is not of type {}", item, element_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_normalize_string_array() {
        let values = normalize(&json!(["RS256", "ES256"]), ValueType::StringArray).unwrap();
        assert_eq!(values, vec!["RS256", "ES256"]);
    }

    #[test]
    fn test_bare_scalar_equals_single_element_array() {
        for (scalar, value_type) in [
            (json!("RS256"), ValueType::StringArray),
            (json!("RS256"), ValueType::String),
            (json!(42), ValueType::Integer),
            (json!(42), ValueType::IntegerArray),
            (json!(true), ValueType::Boolean),
        ] {
            let wrapped = json!([scalar.clone()]);
            assert_eq!(
                normalize(&scalar, value_type).unwrap(),
                normalize(&wrapped, value_type).unwrap(),
                "type {}",
                value_type
            );
        }
    }

    #[test]
    fn test_null_and_empty_array_are_empty() {
        assert!(normalize(&Value::Null, ValueType::String).unwrap().is_empty());
        assert!(normalize(&json!([]), ValueType::StringArray).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_items_fail_translation() {
        let err = normalize(&json!(["a", 1]), ValueType::StringArray).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));

        let err = normalize(&json!({"a": 1}), ValueType::String).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));

        let err = normalize(&json!(1.5), ValueType::Integer).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));
    }

    #[test]
    fn test_multiple_values_for_scalar_type_fail() {
        let err = normalize(&json!(["a", "b"]), ValueType::String).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));
    }

    #[test]
    fn test_denormalize_typed_values() {
        assert_eq!(
            denormalize(&["1".to_string(), "2".to_string()], ValueType::IntegerArray).unwrap(),
            json!([1, 2])
        );
        assert_eq!(denormalize(&["true".to_string()], ValueType::Boolean).unwrap(), json!(true));
        assert_eq!(denormalize(&[], ValueType::String).unwrap(), Value::Null);
        assert!(denormalize(&["a".to_string(), "b".to_string()], ValueType::String).is_err());
    }

    #[test]
    fn test_unsigned_integers_beyond_i64_are_stable() {
        let first = normalize(&json!([u64::MAX, -1]), ValueType::IntegerArray).unwrap();
        assert_eq!(first, vec![u64::MAX.to_string(), "-1".to_string()]);

        let second = normalize(&json!(first.clone()), ValueType::IntegerArray).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            denormalize(&first, ValueType::IntegerArray).unwrap(),
            json!([u64::MAX, -1])
        );

        let err = normalize(&json!("18446744073709551616"), ValueType::Integer).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));
    }

    proptest! {
        #[test]
        fn prop_unsigned_normalization_is_idempotent(
            items in prop::collection::vec(any::<u64>(), 0..6),
        ) {
            let first = normalize(&json!(items), ValueType::IntegerArray).unwrap();
            let second = normalize(&json!(first.clone()), ValueType::IntegerArray).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(denormalize(&first, ValueType::IntegerArray).unwrap(), json!(items));
        }

        #[test]
        fn prop_normalization_is_idempotent(
            items in prop::collection::vec("[a-zA-Z0-9_]{0,8}", 0..6),
        ) {
            let first = normalize(&json!(items), ValueType::StringArray).unwrap();
            let second = normalize(&json!(first.clone()), ValueType::StringArray).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_integer_normalization_is_idempotent(
            items in prop::collection::vec(any::<i64>(), 0..6),
        ) {
            let first = normalize(&json!(items), ValueType::IntegerArray).unwrap();
            let second = normalize(&json!(first.clone()), ValueType::IntegerArray).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(denormalize(&first, ValueType::IntegerArray).unwrap(), json!(items));
        }

        #[test]
        fn prop_scalar_matches_singleton(value in any::<i64>(), text in "[a-z]{1,10}") {
            prop_assert_eq!(
                normalize(&json!(value), ValueType::IntegerArray).unwrap(),
                normalize(&json!([value]), ValueType::IntegerArray).unwrap()
            );
            prop_assert_eq!(
                normalize(&json!(text.clone()), ValueType::String).unwrap(),
                normalize(&json!([text]), ValueType::String).unwrap()
            );
        }
    }
}
