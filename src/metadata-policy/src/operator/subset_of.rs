//! The `subset_of` operator: published values must come from a fixed set

use super::{intersection, is_subset, kind_mismatch, Operator, OperatorValue, PolicyOperator};
use crate::error::Result;
use crate::types::ValueType;
use serde_json::Value;

/// Restricts the values of a parameter to a subset of an allowed set
///
/// Unlike `one_of`, an empty set is allowed: it means no value may be
/// published at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetOfOperator {
    value: OperatorValue,
}

impl SubsetOfOperator {
    pub const NAME: &'static str = "subset_of";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let policy_value_type = value_type.array_type()?;
        let value = OperatorValue::new(Self::NAME, raw, value_type, policy_value_type, true)?;
        Ok(Self { value })
    }
}

impl PolicyOperator for SubsetOfOperator {
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
        let Operator::SubsetOf(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        let allowed = intersection(self.normalized_value(), subordinate.normalized_value());
        let value = OperatorValue::from_normalized(
            Self::NAME,
            &allowed,
            self.value.value_type(),
            self.value.policy_value_type(),
            true,
        )?;
        Ok(Operator::SubsetOf(Self { value }))
    }

    /// Drops published values that are not in the allowed set
    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        intersection(current, self.normalized_value())
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        is_subset(current, self.normalized_value())
    }
}
