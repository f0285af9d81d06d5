//! The `essential` operator: whether a parameter must be present

use super::{kind_mismatch, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use serde_json::Value;

/// Marks a parameter as required (`true`) or optional (`false`)
///
/// A subordinate may tighten `false` to `true` but never relax `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct EssentialOperator {
    value: OperatorValue,
}

impl EssentialOperator {
    pub const NAME: &'static str = "essential";

    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        let value = OperatorValue::new(Self::NAME, raw, value_type, ValueType::Boolean, false)?;
        Ok(Self { value })
    }

    /// Whether the parameter is required
    pub fn is_essential(&self) -> bool {
        self.normalized_value().first().map(String::as_str) == Some("true")
    }
}

impl PolicyOperator for EssentialOperator {
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
        let Operator::Essential(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        if self.is_essential() && !subordinate.is_essential() {
            return Err(PolicyError::merge(
                Self::NAME,
                "subordinate cannot make an essential parameter optional",
            ));
        }

        let merged = Self::new(
            Value::Bool(self.is_essential() || subordinate.is_essential()),
            self.value.value_type(),
        )?;
        Ok(Operator::Essential(merged))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        current.to_vec()
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        !self.is_essential() || !current.is_empty()
    }
}
