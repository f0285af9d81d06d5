//! The `value` operator: the parameter is set to a fixed value

use super::{kind_mismatch, set_eq, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::Value;

/// Forces a parameter to a fixed value
///
/// A `null` value removes the parameter from the metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueOperator {
    value: OperatorValue,
}

impl ValueOperator {
    pub const NAME: &'static str = "value";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let value = OperatorValue::new(Self::NAME, raw, value_type, value_type, true)?;
        Ok(Self { value })
    }

    /// Whether this operator removes the parameter
    pub fn removes_parameter(&self) -> bool {
        self.normalized_value().is_empty()
    }
}

impl PolicyOperator for ValueOperator {
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
        let Operator::Value(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        if !set_eq(self.normalized_value(), subordinate.normalized_value()) {
            return Err(PolicyError::merge(
                Self::NAME,
                format!(
                    "superior value {} differs from subordinate value {}",
                    self.value.raw(),
                    subordinate.value.raw()
                ),
            ));
        }

        Ok(Operator::Value(self.clone()))
    }

    fn modified_metadata_values(&self, _current: &[String]) -> Vec<String> {
        self.normalized_value().to_vec()
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        set_eq(current, self.normalized_value())
    }
}
