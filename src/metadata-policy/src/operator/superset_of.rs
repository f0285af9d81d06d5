//! The `superset_of` operator: published values must include a fixed set

use super::{is_subset, kind_mismatch, union, Operator, OperatorValue, PolicyOperator};
use crate::error::Result;
use crate::types::ValueType;
use serde_json::Value;

/// Requires the published values of a parameter to include every value of a
/// required set
#[derive(Debug, Clone, PartialEq)]
pub struct SupersetOfOperator {
    value: OperatorValue,
}

impl SupersetOfOperator {
    pub const NAME: &'static str = "superset_of";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let policy_value_type = value_type.array_type()?;
        let value = OperatorValue::new(Self::NAME, raw, value_type, policy_value_type, true)?;
        Ok(Self { value })
    }
}

impl PolicyOperator for SupersetOfOperator {
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
        let Operator::SupersetOf(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        let required = union(self.normalized_value(), subordinate.normalized_value());
        let value = OperatorValue::from_normalized(
            Self::NAME,
            &required,
            self.value.value_type(),
            self.value.policy_value_type(),
            true,
        )?;
        Ok(Operator::SupersetOf(Self { value }))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        current.to_vec()
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        is_subset(self.normalized_value(), current)
    }
}
