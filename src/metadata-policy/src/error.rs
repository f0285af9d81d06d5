//! Error types for the metadata policy engine

use std::fmt;
use thiserror::Error;

/// Metadata policy errors
///
/// The three kinds are kept apart so that a trust chain evaluator can tell a
/// malformed statement from a chain whose authorities disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A raw value could not be normalized to its declared type
    #[error("Policy translation failed: {0}")]
    Translation(String),

    /// A well-typed value violates an operator precondition
    #[error("Policy processing failed: {0}")]
    Processing(String),

    /// Two policies could not be combined into a satisfiable result
    #[error("Policy merge failed: {0}")]
    Merge(MergeConflict),
}

impl PolicyError {
    /// Build a merge error without chain context
    pub fn merge(operator: &str, reason: impl Into<String>) -> Self {
        Self::Merge(MergeConflict::new(operator, reason))
    }

    /// Error kind discriminator
    pub fn kind(&self) -> PolicyErrorKind {
        match self {
            Self::Translation(_) => PolicyErrorKind::Translation,
            Self::Processing(_) => PolicyErrorKind::Processing,
            Self::Merge(_) => PolicyErrorKind::Merge,
        }
    }

    /// Merge conflict details, if this is a merge error
    pub fn conflict(&self) -> Option<&MergeConflict> {
        match self {
            Self::Merge(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Attach the parameter name to a merge error
    pub(crate) fn for_parameter(self, parameter: &str) -> Self {
        match self {
            Self::Merge(mut conflict) => {
                if conflict.parameter.is_none() {
                    conflict.parameter = Some(parameter.to_string());
                }
                Self::Merge(conflict)
            }
            other => other,
        }
    }

    /// Attach the pair of chain links that conflicted to a merge error
    pub(crate) fn between(self, superior: LinkRef, subordinate: LinkRef) -> Self {
        match self {
            Self::Merge(mut conflict) => {
                conflict.superior = Some(superior);
                conflict.subordinate = Some(subordinate);
                Self::Merge(conflict)
            }
            other => other,
        }
    }
}

/// Discriminator for [`PolicyError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyErrorKind {
    Translation,
    Processing,
    Merge,
}

impl fmt::Display for PolicyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => write!(f, "translation"),
            Self::Processing => write!(f, "processing"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Reference to one statement in a trust chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Position in the chain, 0 being the trust anchor
    pub index: usize,

    /// Issuer of the statement, when known
    pub issuer: Option<String>,
}

impl fmt::Display for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "link {} ({})", self.index, issuer),
            None => write!(f, "link {}", self.index),
        }
    }
}

/// Details of a failed merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    /// Metadata parameter being merged
    pub parameter: Option<String>,

    /// Operator that failed to merge
    pub operator: String,

    /// Statement closer to the trust anchor
    pub superior: Option<LinkRef>,

    /// Statement closer to the leaf
    pub subordinate: Option<LinkRef>,

    /// What made the combination unsatisfiable
    pub reason: String,
}

impl MergeConflict {
    pub fn new(operator: &str, reason: impl Into<String>) -> Self {
        Self {
            parameter: None,
            operator: operator.to_string(),
            superior: None,
            subordinate: None,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.operator)?;
        if let Some(parameter) = &self.parameter {
            write!(f, " on '{}'", parameter)?;
        }
        if let (Some(superior), Some(subordinate)) = (&self.superior, &self.subordinate) {
            write!(f, " between {} and {}", superior, subordinate)?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Result type for metadata policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;
