//! The `one_of` operator: the published value must be one of a fixed set

use super::{intersection, kind_mismatch, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::Value;

/// Restricts a single-valued parameter to a set of allowed values
///
/// The allowed set is always stored as an array, even though the constrained
/// parameter itself is a scalar. An empty allowed set can never be satisfied
/// and is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfOperator {
    value: OperatorValue,
}

impl OneOfOperator {
    pub const NAME: &'static str = "one_of";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let policy_value_type = value_type.array_type()?;
        let value = OperatorValue::new(Self::NAME, raw, value_type, policy_value_type, false)?;
        Ok(Self { value })
    }
}

impl PolicyOperator for OneOfOperator {
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
        let Operator::OneOf(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        let allowed = intersection(self.normalized_value(), subordinate.normalized_value());
        if allowed.is_empty() {
            return Err(PolicyError::merge(
                Self::NAME,
                format!(
                    "superior values {:?} and subordinate values {:?} have no value in common",
                    self.normalized_value(),
                    subordinate.normalized_value()
                ),
            ));
        }

        let value = OperatorValue::from_normalized(
            Self::NAME,
            &allowed,
            self.value.value_type(),
            self.value.policy_value_type(),
            false,
        )?;
        Ok(Operator::OneOf(Self { value }))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        current.to_vec()
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        match current {
            [single] => self.normalized_value().contains(single),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn one_of(values: Value) -> Operator {
        Operator::OneOf(OneOfOperator::new(values, ValueType::String).unwrap())
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_merge_intersects_allowed_values() {
        let a = one_of(json!(["x", "y", "z"]));
        let b = one_of(json!(["y", "z", "w"]));

        let merged = a.merge_with_subordinate(&b).unwrap();
        assert_eq!(merged.name(), "one_of");
        assert_eq!(merged.normalized_value(), strings(&["y", "z"]));
        assert_eq!(merged.value().raw(), &json!(["y", "z"]));
    }

    #[test]
    fn test_disjoint_merge_fails_with_merge_error() {
        let a = one_of(json!(["x", "y", "z"]));
        let c = one_of(json!(["q"]));

        let err = a.merge_with_subordinate(&c).unwrap_err();
        assert!(matches!(err, PolicyError::Merge(_)));
    }

    #[test]
    fn test_metadata_validity() {
        let merged = one_of(json!(["x", "y", "z"]))
            .merge_with_subordinate(&one_of(json!(["y", "z", "w"])))
            .unwrap();

        assert!(merged.is_metadata_valid(&strings(&["y"])));
        assert!(!merged.is_metadata_valid(&strings(&["y", "z"])));
        assert!(!merged.is_metadata_valid(&strings(&["q"])));
        assert!(!merged.is_metadata_valid(&[]));
    }

    #[test]
    fn test_empty_value_is_processing_error() {
        for value_type in [
            ValueType::String,
            ValueType::StringArray,
            ValueType::Integer,
            ValueType::IntegerArray,
            ValueType::Boolean,
        ] {
            for raw in [json!([]), Value::Null] {
                let err = OneOfOperator::new(raw, value_type).unwrap_err();
                assert!(matches!(err, PolicyError::Processing(_)), "type {}", value_type);
            }
        }
    }

    #[test]
    fn test_malformed_value_is_translation_error() {
        let err = OneOfOperator::new(json!(["RS256", 256]), ValueType::String).unwrap_err();
        assert!(matches!(err, PolicyError::Translation(_)));
    }

    #[test]
    fn test_scalar_value_is_stored_as_set() {
        let op = OneOfOperator::new(json!("RS256"), ValueType::String).unwrap();
        assert_eq!(op.value().policy_value_type(), ValueType::StringArray);
        assert_eq!(op.normalized_value(), ["RS256"]);
        assert!(!op.is_empty_value_allowed());
    }

    fn integer_one_of(values: Value) -> Operator {
        Operator::OneOf(OneOfOperator::new(values, ValueType::Integer).unwrap())
    }

    #[test]
    fn test_integer_parameter() {
        let a = integer_one_of(json!([300, 600, 900]));
        let b = integer_one_of(json!(600));
        let merged = a.merge_with_subordinate(&b).unwrap();
        assert_eq!(merged.value().raw(), &json!([600]));
        assert!(merged.is_metadata_valid(&strings(&["600"])));
    }

    #[test]
    fn test_integer_merge_beyond_i64() {
        let a = integer_one_of(json!([u64::MAX, 1]));
        let b = integer_one_of(json!([u64::MAX]));
        let merged = a.merge_with_subordinate(&b).unwrap();
        assert_eq!(merged.value().raw(), &json!([u64::MAX]));
        assert!(merged.is_metadata_valid(&[u64::MAX.to_string()]));
    }

    proptest! {
        #[test]
        fn prop_transformation_is_identity(values in prop::collection::vec("[a-z]{0,6}", 0..8)) {
            let op = one_of(json!(["a", "b"]));
            prop_assert_eq!(op.modified_metadata_values(&values), values);
        }

        #[test]
        fn prop_merge_is_associative(
            a in prop::collection::btree_set("[a-e]", 1..5),
            b in prop::collection::btree_set("[a-e]", 1..5),
            c in prop::collection::btree_set("[a-e]", 1..5),
        ) {
            let (a, b, c) = (one_of(json!(a)), one_of(json!(b)), one_of(json!(c)));

            let left = a.merge_with_subordinate(&b).and_then(|ab| ab.merge_with_subordinate(&c));
            let right = b.merge_with_subordinate(&c).and_then(|bc| a.merge_with_subordinate(&bc));

            match (left, right) {
                (Ok(left), Ok(right)) => {
                    prop_assert_eq!(left.normalized_value(), right.normalized_value());
                }
                (Err(left), Err(right)) => {
                    prop_assert!(matches!(left, PolicyError::Merge(_)));
                    prop_assert!(matches!(right, PolicyError::Merge(_)));
                }
                (left, right) => {
                    prop_assert!(false, "fold order changed outcome: {:?} vs {:?}", left, right);
                }
            }
        }
    }
}
