//! Metadata policy operators
//!
//! Every operator kind implements [`PolicyOperator`]. The closed set of kinds
//! is the [`Operator`] enum, which is what merges and policies hold.
//!
//! # Example
//!
//! ```rust
//! use cretoai_metadata_policy::operator::{Operator, PolicyOperator};
//! use cretoai_metadata_policy::ValueType;
//! use serde_json::json;
//!
//! let superior = Operator::from_raw("one_of", json!(["RS256", "ES256"]), ValueType::String)?;
//! let subordinate = Operator::from_raw("one_of", json!(["ES256", "PS256"]), ValueType::String)?;
//!
//! let merged = superior.merge_with_subordinate(&subordinate)?;
//! assert_eq!(merged.normalized_value(), ["ES256"]);
//! assert!(merged.is_metadata_valid(&["ES256".to_string()]));
//! # Ok::<(), cretoai_metadata_policy::PolicyError>(())
//! ```

pub mod add;
pub mod default;
pub mod essential;
pub mod one_of;
pub mod regexp;
pub mod subset_of;
pub mod superset_of;
pub mod value;

pub use add::AddOperator;
pub use default::DefaultOperator;
pub use essential::EssentialOperator;
pub use one_of::OneOfOperator;
pub use regexp::RegexpOperator;
pub use subset_of::SubsetOfOperator;
pub use superset_of::SupersetOfOperator;
pub use value::ValueOperator;

use crate::error::{PolicyError, Result};
use crate::normalize::{denormalize, normalize};
use crate::types::ValueType;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Order in which operators of one parameter are applied to metadata
pub const APPLICATION_ORDER: [&str; 8] = [
    ValueOperator::NAME,
    AddOperator::NAME,
    DefaultOperator::NAME,
    OneOfOperator::NAME,
    SubsetOfOperator::NAME,
    SupersetOfOperator::NAME,
    EssentialOperator::NAME,
    RegexpOperator::NAME,
];

/// Capability set shared by all operator kinds
pub trait PolicyOperator: fmt::Debug + Send + Sync {
    /// Operator identifier used in `metadata_policy` objects
    fn name(&self) -> &'static str;

    /// Value held by the operator
    fn value(&self) -> &OperatorValue;

    /// Normalized operator value
    fn normalized_value(&self) -> &[String] {
        self.value().normalized()
    }

    /// Whether the operator may hold an empty value
    fn is_empty_value_allowed(&self) -> bool;

    /// Combine this (superior) operator with a subordinate operator of the
    /// same kind into a new operator
    fn merge_with_subordinate(&self, subordinate: &Operator) -> Result<Operator>;

    /// Metadata values after this operator's transformation
    fn modified_metadata_values(&self, current: &[String]) -> Vec<String>;

    /// Whether the metadata values satisfy this operator
    fn is_metadata_valid(&self, current: &[String]) -> bool;
}

/// Immutable value shared by every operator kind
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorValue {
    /// Value as received
    raw: Value,

    /// Declared type of the metadata parameter
    value_type: ValueType,

    /// Type the operator value is normalized as
    policy_value_type: ValueType,

    /// Normalized operator value
    normalized: Vec<String>,
}

impl OperatorValue {
    /// Normalize a raw operator value
    ///
    /// Fails with a translation error if the value does not fit
    /// `policy_value_type`, or a processing error if it is empty and the
    /// operator does not allow that.
    pub fn new(
        operator: &str,
        raw: Value,
        value_type: ValueType,
        policy_value_type: ValueType,
        empty_allowed: bool,
    ) -> Result<Self> {
        let normalized = normalize(&raw, policy_value_type)?;
        if normalized.is_empty() && !empty_allowed {
            return Err(PolicyError::Processing(format!(
                "The '{}' operator does not allow an empty value",
                operator
            )));
        }

        Ok(Self {
            raw,
            value_type,
            policy_value_type,
            normalized,
        })
    }

    /// Rebuild a value from an already normalized sequence
    pub(crate) fn from_normalized(
        operator: &str,
        normalized: &[String],
        value_type: ValueType,
        policy_value_type: ValueType,
        empty_allowed: bool,
    ) -> Result<Self> {
        let raw = denormalize(normalized, policy_value_type)?;
        Self::new(operator, raw, value_type, policy_value_type, empty_allowed)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn policy_value_type(&self) -> ValueType {
        self.policy_value_type
    }

    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }
}

/// Closed set of operator kinds
#[derive(Debug, Clone)]
pub enum Operator {
    Value(ValueOperator),
    Add(AddOperator),
    Default(DefaultOperator),
    OneOf(OneOfOperator),
    SubsetOf(SubsetOfOperator),
    SupersetOf(SupersetOfOperator),
    Essential(EssentialOperator),
    Regexp(RegexpOperator),
}

impl Operator {
    /// Construct an operator from its name, raw value and the declared type
    /// of the parameter it constrains
    pub fn from_raw(name: &str, raw: Value, value_type: ValueType) -> Result<Self> {
        match name {
            ValueOperator::NAME => Ok(Self::Value(ValueOperator::new(raw, value_type)?)),
            AddOperator::NAME => Ok(Self::Add(AddOperator::new(raw, value_type)?)),
            DefaultOperator::NAME => Ok(Self::Default(DefaultOperator::new(raw, value_type)?)),
            OneOfOperator::NAME => Ok(Self::OneOf(OneOfOperator::new(raw, value_type)?)),
            SubsetOfOperator::NAME => Ok(Self::SubsetOf(SubsetOfOperator::new(raw, value_type)?)),
            SupersetOfOperator::NAME => {
                Ok(Self::SupersetOf(SupersetOfOperator::new(raw, value_type)?))
            }
            EssentialOperator::NAME => {
                Ok(Self::Essential(EssentialOperator::new(raw, value_type)?))
            }
            RegexpOperator::NAME => Ok(Self::Regexp(RegexpOperator::new(raw, value_type)?)),
            unknown => Err(PolicyError::Processing(format!(
                "Unsupported policy operator '{}'",
                unknown
            ))),
        }
    }

    /// Whether `name` is a supported operator
    pub fn is_supported(name: &str) -> bool {
        APPLICATION_ORDER.contains(&name)
    }

    fn inner(&self) -> &dyn PolicyOperator {
        match self {
            Self::Value(op) => op,
            Self::Add(op) => op,
            Self::Default(op) => op,
            Self::OneOf(op) => op,
            Self::SubsetOf(op) => op,
            Self::SupersetOf(op) => op,
            Self::Essential(op) => op,
            Self::Regexp(op) => op,
        }
    }
}

impl PolicyOperator for Operator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn value(&self) -> &OperatorValue {
        self.inner().value()
    }

    fn is_empty_value_allowed(&self) -> bool {
        self.inner().is_empty_value_allowed()
    }

    fn merge_with_subordinate(&self, subordinate: &Operator) -> Result<Operator> {
        self.inner().merge_with_subordinate(subordinate)
    }

    fn modified_metadata_values(&self, current: &[String]) -> Vec<String> {
        self.inner().modified_metadata_values(current)
    }

    fn is_metadata_valid(&self, current: &[String]) -> bool {
        self.inner().is_metadata_valid(current)
    }
}

/// Merge error for a subordinate of a different kind
pub(crate) fn kind_mismatch(expected: &str, subordinate: &Operator) -> PolicyError {
    PolicyError::merge(
        expected,
        format!(
            "cannot merge with subordinate '{}' operator",
            subordinate.name()
        ),
    )
}

/// Elements of `a` also in `b`, in the order of `a`, without duplicates
pub(crate) fn intersection(a: &[String], b: &[String]) -> Vec<String> {
    let other: HashSet<&String> = b.iter().collect();
    let mut seen = HashSet::new();
    a.iter()
        .filter(|v| other.contains(v) && seen.insert(*v))
        .cloned()
        .collect()
}

/// Elements of `a` followed by elements of `b` not in `a`, without duplicates
pub(crate) fn union(a: &[String], b: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    a.iter()
        .chain(b.iter())
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

/// Whether every element of `a` is in `b`
pub(crate) fn is_subset(a: &[String], b: &[String]) -> bool {
    let other: HashSet<&String> = b.iter().collect();
    a.iter().all(|v| other.contains(v))
}

/// Whether `a` and `b` hold the same elements, ignoring order and repeats
pub(crate) fn set_eq(a: &[String], b: &[String]) -> bool {
    is_subset(a, b) && is_subset(b, a)
}
