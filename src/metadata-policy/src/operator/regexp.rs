//! The `regexp` operator: published values must match patterns

use super::{kind_mismatch, union, Operator, OperatorValue, PolicyOperator};
use crate::error::{PolicyError, Result};
use crate::types::ValueType;
use regex::Regex;
use serde_json::Value;

/// Requires every published value to match every pattern
///
/// Patterns from successive chain links accumulate, so a subordinate can only
/// narrow what is accepted.
#[derive(Debug, Clone)]
pub struct RegexpOperator {
    value: OperatorValue,
    patterns: Vec<Regex>,
}

impl RegexpOperator {
    pub const NAME: &'static str = "regexp";

    /// Patterns that fail to compile are a translation error
    pub fn new(raw: Value, value_type: ValueType) -> Result<Self> {
        if value_type == ValueType::Boolean {
            return Err(PolicyError::Processing(format!(
                "The '{}' operator cannot constrain a boolean parameter",
                Self::NAME
            )));
        }

        let value = OperatorValue::new(Self::NAME, raw, value_type, ValueType::StringArray, false)?;
        let patterns = value
            .normalized()
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    PolicyError::Translation(format!("Invalid pattern '{}': {}", pattern, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { value, patterns })
    }
}

impl PolicyOperator for RegexpOperator {
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
        let Operator::Regexp(subordinate) = subordinate else {
            return Err(kind_mismatch(Self::NAME, subordinate));
        };

        let patterns = union(self.normalized_value(), subordinate.normalized_value());
        let merged = Self::new(Value::from(patterns), self.value.value_type())?;
        Ok(Operator::Regexp(merged))
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        current.to_vec()
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        current
            .iter()
            .all(|value| self.patterns.iter().all(|pattern| pattern.is_match(value)))
    }
}
