//! The `default` operator: a value used when none is published

use super::{kind_mismatch, set_eq, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultOperator {
    value: OperatorValue,
}

impl DefaultOperator {
    pub const NAME: &'static str = "default";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let value = OperatorValue::new(Self::NAME, raw, value_type, value_type, false)?;
        Ok(Self { value })
    }
}

impl PolicyOperator for DefaultOperator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn value(&self) -> &OperatorValue {
        &self.value
    }

    fn is_empty_value_allowed(&self) -> bool {
        false
    }

    fn merge_with_subordinate(&self, subordinate: &Operator) -> Result<Operator> {
        let Operator::Default(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        if !set_eq(self.normalized_value(), subordinate.normalized_value()) {
            return Err(PolicyError::merge(
                Self::NAME,
                format!(
                    "superior default {} differs from subordinate default {}",
                    self.value.raw(),
                    subordinate.value.raw()
                ),
            ));
        }

        Ok(Operator::Default(self.clone()))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        if current.is_empty() {
            self.normalized_value().to_vec()
        } else {
            current.to_vec()
        }
    }

    fn is_metadata_valid(&self, _current: &[String]) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_fills_missing_value_only() {
        let op =
            DefaultOperator::new(json!(["authorization_code"]), ValueType::StringArray).unwrap();
        assert_eq!(op.modified_metadata_values(&[]), ["authorization_code"]);
        assert_eq!(
            op.modified_metadata_values(&["implicit".to_string()]),
            ["implicit"]
        );
    }

    #[test]
    fn test_empty_default_is_rejected() {
        let err = DefaultOperator::new(Value::Null, ValueType::String).unwrap_err();
        assert!(matches!(err, PolicyError::Processing(_)));
    }

    #[test]
    fn test_conflicting_defaults_fail_to_merge() {
        let a = Operator::from_raw("default", json!(300), ValueType::Integer).unwrap();
        let b = Operator::from_raw("default", json!(600), ValueType::Integer).unwrap();
        assert!(matches!(
            a.merge_with_subordinate(&b),
            Err(PolicyError::Merge(_))
        ));

        let c = Operator::from_raw("default", json!("300"), ValueType::Integer).unwrap();
        assert!(a.merge_with_subordinate(&c).is_ok());
    }
}
