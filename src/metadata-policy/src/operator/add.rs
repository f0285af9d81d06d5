//! The `add` operator: values appended to an array-valued parameter

use super::{is_subset, kind_mismatch, union, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct AddOperator {
    value: OperatorValue,
}

impl AddOperator {
    pub const NAME: &'static str = "add";

    /// Only array-valued parameters can be added to
    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        if !value_type.is_array() {
            return Err(PolicyError::Processing(format!(
                "The '{}' operator requires an array-valued parameter, not {}",
                Self::NAME,
                value_type
            )));
        }
        let value = OperatorValue::new(Self::NAME, raw, value_type, value_type, true)?;
        Ok(Self { value })
    }
}

impl PolicyOperator for AddOperator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn value(&self) -> &OperatorValue {
        &self.value
    }

    fn is_empty_value_allowed(&self) -> bool {
        true
    }

    fn merge_with_subordinate(&self, subordinate: &Operator) -> Result<Operator> {
        let Operator::Add(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        let added = union(self.normalized_value(), subordinate.normalized_value());
        let value = OperatorValue::from_normalized(
            Self::NAME,
            &added,
            self.value.value_type(),
            self.value.policy_value_type(),
            true,
        )?;
        Ok(Operator::Add(Self { value }))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        union(current, self.normalized_value())
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        is_subset(self.normalized_value(), current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_add_appends_missing_values() {
        let op = AddOperator::new(
            json!(["ops@ta.example", "ops@ia.example"]),
            ValueType::StringArray,
        )
        .unwrap();
        let modified =
            op.modified_metadata_values(&strings(&["admin@rp.example", "ops@ia.example"]));
        assert_eq!(
            modified,
            strings(&["admin@rp.example", "ops@ia.example", "ops@ta.example"])
        );
        assert!(op.is_metadata_valid(&modified));
        assert!(!op.is_metadata_valid(&strings(&["admin@rp.example"])));
    }

    #[test]
    fn test_merge_unions_values() {
        let a = Operator::from_raw("add", json!("a"), ValueType::StringArray).unwrap();
        let b = Operator::from_raw("add", json!(["b", "a"]), ValueType::StringArray).unwrap();
        let merged = a.merge_with_subordinate(&b).unwrap();
        assert_eq!(merged.normalized_value(), strings(&["a", "b"]));
    }

    #[test]
    fn test_scalar_parameter_is_rejected() {
        let err = AddOperator::new(json!("a"), ValueType::String).unwrap_err();
        assert!(matches!(err, PolicyError::Processing(_)));
    }
}
