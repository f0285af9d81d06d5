//! Effective policies and their application to metadata

use crate::error::{PolicyError, Result};
use crate::normalize::{denormalize, normalize};
use crate::operator::{
    is_subset, AddOperator, DefaultOperator, EssentialOperator, OneOfOperator, Operator,
    PolicyOperator, SubsetOfOperator, SupersetOfOperator, ValueOperator, APPLICATION_ORDER,
};
use crate::types::{MetadataValues, ParameterName, ValueType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Effective operators for one metadata parameter, at most one per name
#[derive(Debug, Clone)]
pub struct ParameterPolicy {
    name: ParameterName,
    value_type: ValueType,
    operators: BTreeMap<&'static str, Operator>,
}

impl ParameterPolicy {
    /// Create an empty policy for a parameter
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            operators: BTreeMap::new(),
        }
    }

    /// Add an operator, replacing any operator of the same name
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.insert(operator);
        self
    }

    pub(crate) fn insert(&mut self, operator: Operator) {
        self.operators.insert(operator.name(), operator);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Operator with the given name
    pub fn operator(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    /// Operators in application order
    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        APPLICATION_ORDER
            .iter()
            .filter_map(move |name| self.operators.get(name))
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Check that the operators of this parameter can be satisfied together
    ///
    /// Each operator may be consistent with its own chain and still
    /// contradict another operator on the same parameter, e.g. a `value`
    /// outside the `one_of` set.
    pub fn check_combination(&self) -> Result<()> {
        let values = |name: &str| self.operator(name).map(|op| op.normalized_value());

        let subset_of = values(SubsetOfOperator::NAME);
        let superset_of = values(SupersetOfOperator::NAME);
        let one_of = values(OneOfOperator::NAME);

        if let (Some(add), Some(subset_of)) = (values(AddOperator::NAME), subset_of) {
            if !is_subset(add, subset_of) {
                return Err(self.conflict(AddOperator::NAME, "added values are not in subset_of"));
            }
        }

        if let (Some(superset_of), Some(subset_of)) = (superset_of, subset_of) {
            if !is_subset(superset_of, subset_of) {
                return Err(self.conflict(
                    SupersetOfOperator::NAME,
                    "superset_of requires values that subset_of excludes",
                ));
            }
        }

        if let Some(value) = self.operator(ValueOperator::NAME) {
            let value = value.normalized_value();
            if value.is_empty() {
                if self.is_essential() {
                    return Err(self.conflict(
                        ValueOperator::NAME,
                        "essential parameter is removed by a null value",
                    ));
                }
            } else {
                if let Some(one_of) = one_of {
                    if value.len() != 1 || !is_subset(value, one_of) {
                        return Err(self.conflict(ValueOperator::NAME, "value is not in one_of"));
                    }
                }
                if let Some(subset_of) = subset_of {
                    if !is_subset(value, subset_of) {
                        return Err(self.conflict(
                            ValueOperator::NAME,
                            "value is not a subset of subset_of",
                        ));
                    }
                }
                if let Some(superset_of) = superset_of {
                    if !is_subset(superset_of, value) {
                        return Err(self.conflict(
                            ValueOperator::NAME,
                            "value is not a superset of superset_of",
                        ));
                    }
                }
            }
        }

        if let Some(default) = values(DefaultOperator::NAME) {
            if let Some(one_of) = one_of {
                if !is_subset(default, one_of) {
                    return Err(self.conflict(DefaultOperator::NAME, "default is not in one_of"));
                }
            }
            if let Some(subset_of) = subset_of {
                if !is_subset(default, subset_of) {
                    return Err(self.conflict(
                        DefaultOperator::NAME,
                        "default is not a subset of subset_of",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Transform published values by every operator, in application order
    pub fn apply(&self, current: &[String]) -> MetadataValues {
        self.operators()
            .fold(current.to_vec(), |values, op| op.modified_metadata_values(&values))
    }

    /// Names of the operators the values do not satisfy
    ///
    /// A parameter that is not published is only checked against
    /// `essential`; the other operators constrain published values.
    pub fn violations(&self, current: &[String]) -> Vec<&'static str> {
        self.enforced_operators(current.is_empty())
            .filter(|op| !op.is_metadata_valid(current))
            .map(|op| op.name())
            .collect()
    }

    /// Whether the values satisfy every enforced operator
    pub fn is_valid(&self, current: &[String]) -> bool {
        self.enforced_operators(current.is_empty())
            .all(|op| op.is_metadata_valid(current))
    }

    /// The policy as a `metadata_policy` parameter entry
    pub fn to_json(&self) -> Value {
        let entry: Map<String, Value> = self
            .operators()
            .map(|op| (op.name().to_string(), op.value().raw().clone()))
            .collect();
        Value::Object(entry)
    }

    fn enforced_operators(&self, absent: bool) -> impl Iterator<Item = &Operator> + '_ {
        self.operators()
            .filter(move |op| !absent || op.name() == EssentialOperator::NAME)
    }

    fn is_essential(&self) -> bool {
        matches!(
            self.operator(EssentialOperator::NAME),
            Some(Operator::Essential(op)) if op.is_essential()
        )
    }

    fn conflict(&self, operator: &str, reason: &str) -> PolicyError {
        PolicyError::merge(operator, reason).for_parameter(&self.name)
    }
}

/// A metadata parameter that fails its effective policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub parameter: ParameterName,
    pub operator: &'static str,
    pub values: MetadataValues,
}

/// Effective policy for a whole metadata object
///
/// Merged operator values keep the order of the most superior statement that
/// introduced them. Validation compares values as sets, so consumers should
/// not rely on that order.
#[derive(Debug, Clone, Default)]
pub struct MetadataPolicy {
    parameters: BTreeMap<ParameterName, ParameterPolicy>,
}

impl MetadataPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter policy, replacing any policy for the same parameter
    pub fn insert(&mut self, policy: ParameterPolicy) {
        self.parameters.insert(policy.name.clone(), policy);
    }

    /// Policy of a parameter
    pub fn get(&self, parameter: &str) -> Option<&ParameterPolicy> {
        self.parameters.get(parameter)
    }

    /// Parameter policies ordered by parameter name
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterPolicy> {
        self.parameters.values()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Apply the policy to a metadata object
    ///
    /// Parameters without a policy are passed through. A parameter whose
    /// transformed value is empty is removed.
    pub fn apply(&self, metadata: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut result = metadata.clone();

        for policy in self.parameters.values() {
            let current = published_values(metadata, policy)?;
            let modified = policy.apply(&current);

            if modified != current {
                debug!(
                    "Policy modified '{}': {:?} -> {:?}",
                    policy.name, current, modified
                );
            }

            if modified.is_empty() {
                result.remove(&policy.name);
            } else {
                result.insert(policy.name.clone(), denormalize(&modified, policy.value_type)?);
            }
        }

        Ok(result)
    }

    /// Every operator the published metadata fails
    pub fn validate(&self, metadata: &Map<String, Value>) -> Result<Vec<Violation>> {
        let mut violations = Vec::new();

        for policy in self.parameters.values() {
            let current = published_values(metadata, policy)?;
            for operator in policy.violations(&current) {
                violations.push(Violation {
                    parameter: policy.name.clone(),
                    operator,
                    values: current.clone(),
                });
            }
        }

        Ok(violations)
    }

    /// Whether the published metadata satisfies the policy
    pub fn is_valid(&self, metadata: &Map<String, Value>) -> Result<bool> {
        Ok(self.validate(metadata)?.is_empty())
    }

    /// The policy as a `metadata_policy` object
    pub fn to_json(&self) -> Value {
        let policy: Map<String, Value> = self
            .parameters
            .values()
            .map(|p| (p.name.clone(), p.to_json()))
            .collect();
        Value::Object(policy)
    }
}

fn published_values(
    metadata: &Map<String, Value>,
    policy: &ParameterPolicy,
) -> Result<MetadataValues> {
    match metadata.get(&policy.name) {
        Some(value) => normalize(value, policy.value_type).map_err(|e| match e {
            PolicyError::Translation(msg) => {
                PolicyError::Translation(format!("Metadata parameter '{}': {}", policy.name, msg))
            }
            other => other,
        }),
        None => Ok(Vec::new()),
    }
}
