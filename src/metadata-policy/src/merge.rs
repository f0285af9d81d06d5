//! Trust chain policy merging
//!
//! Folds the `metadata_policy` of every statement in a trust chain, from the
//! trust anchor down to the leaf, into one effective policy per parameter.

use crate::config::EngineConfig;
use crate::error::{LinkRef, PolicyError, Result};
use crate::operator::{Operator, PolicyOperator};
use crate::policy::{MetadataPolicy, ParameterPolicy};
use crate::types::{ChainLink, ParameterName, ParameterTypes};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Result of a merge that tolerates per-parameter failures
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Effective policy of every parameter that merged
    pub policy: MetadataPolicy,

    /// Parameters that could not be merged
    pub failures: BTreeMap<ParameterName, PolicyError>,
}

impl MergeOutcome {
    /// Whether every parameter merged
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Merges trust chain policies into effective policies
///
/// # Architecture
///
/// ```text
/// anchor link ─┐
/// intermediate ─┼─→ per parameter: operator name → fold(merge_with_subordinate)
/// leaf link ───┘                     ↓
///                              combination check → ParameterPolicy
/// ```
pub struct PolicyMerger {
    /// Declared parameter types
    types: ParameterTypes,

    /// Engine configuration
    config: EngineConfig,
}

impl PolicyMerger {
    /// Create a merger with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a merger with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            types: config.parameter_types(),
            config,
        }
    }

    /// Replace the parameter type registry
    pub fn with_types(mut self, types: ParameterTypes) -> Self {
        self.types = types;
        self
    }

    pub fn types(&self) -> &ParameterTypes {
        &self.types
    }

    /// Merge a chain into its effective metadata policy
    ///
    /// `links` are ordered from the trust anchor to the leaf. The first
    /// parameter that fails aborts the merge.
    pub fn merge(&self, links: &[ChainLink]) -> Result<MetadataPolicy> {
        let mut policy = MetadataPolicy::new();

        for parameter in policed_parameters(links) {
            if let Some(parameter_policy) = self.merge_parameter(&parameter, links)? {
                policy.insert(parameter_policy);
            }
        }

        info!(
            "Merged {} chain links into policies for {} parameters",
            links.len(),
            policy.len()
        );
        Ok(policy)
    }

    /// Merge a chain, isolating failures per parameter
    ///
    /// Parameters that fail are reported in [`MergeOutcome::failures`] and left
    /// out of the policy; the caller decides whether to reject the chain or
    /// drop them.
    pub fn merge_lenient(&self, links: &[ChainLink]) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for parameter in policed_parameters(links) {
            match self.merge_parameter(&parameter, links) {
                Ok(Some(parameter_policy)) => outcome.policy.insert(parameter_policy),
                Ok(None) => {}
                Err(e) => {
                    warn!("Dropping policy for '{}': {}", parameter, e);
                    outcome.failures.insert(parameter, e);
                }
            }
        }

        outcome
    }

    /// Merge the policy of a single parameter
    ///
    /// Returns `None` if no link constrains the parameter.
    pub fn merge_parameter(
        &self,
        parameter: &str,
        links: &[ChainLink],
    ) -> Result<Option<ParameterPolicy>> {
        let mut merged: BTreeMap<&str, (Operator, LinkRef)> = BTreeMap::new();
        let mut declared = None;

        for (index, link) in links.iter().enumerate() {
            // A parameter entry without operators does not constrain the parameter
            let Some(operators) = link
                .metadata_policy
                .get(parameter)
                .filter(|operators| !operators.is_empty())
            else {
                continue;
            };

            let value_type = match declared {
                Some(value_type) => value_type,
                None => *declared.insert(self.types.value_type(parameter)?),
            };
            let link_ref = LinkRef {
                index,
                issuer: link.issuer.clone(),
            };

            for (name, raw) in operators {
                if !Operator::is_supported(name) {
                    if self.config.ignore_unknown_operators {
                        warn!(
                            "Ignoring unsupported operator '{}' on '{}' at {}",
                            name, parameter, link_ref
                        );
                        continue;
                    }
                    return Err(PolicyError::Processing(format!(
                        "Unsupported policy operator '{}' on '{}' at {}",
                        name, parameter, link_ref
                    )));
                }

                let operator = Operator::from_raw(name, raw.clone(), value_type)
                    .map_err(|e| locate(e, parameter, &link_ref))?;

                // First occurrence is inserted, later ones fold into it
                match merged.entry(name.as_str()) {
                    Entry::Vacant(entry) => {
                        debug!("'{}' on '{}' introduced at {}", name, parameter, link_ref);
                        entry.insert((operator, link_ref.clone()));
                    }
                    Entry::Occupied(mut entry) => {
                        let (existing, superior) = entry.get();
                        let combined = existing
                            .merge_with_subordinate(&operator)
                            .map_err(|e| {
                                e.for_parameter(parameter)
                                    .between(superior.clone(), link_ref.clone())
                            })?;
                        debug!(
                            "'{}' on '{}' merged at {}: {:?}",
                            name,
                            parameter,
                            link_ref,
                            combined.normalized_value()
                        );
                        entry.insert((combined, link_ref.clone()));
                    }
                }
            }
        }

        let Some(value_type) = declared else {
            return Ok(None);
        };

        let mut policy = ParameterPolicy::new(parameter, value_type);
        for (operator, _) in merged.into_values() {
            policy.insert(operator);
        }
        policy.check_combination()?;

        Ok(Some(policy))
    }
}

impl Default for PolicyMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameter names constrained anywhere in the chain
fn policed_parameters(links: &[ChainLink]) -> BTreeSet<ParameterName> {
    links
        .iter()
        .flat_map(|link| link.metadata_policy.keys().cloned())
        .collect()
}

/// Prefix construction errors with where they happened
fn locate(error: PolicyError, parameter: &str, link: &LinkRef) -> PolicyError {
    match error {
        PolicyError::Translation(msg) => {
            PolicyError::Translation(format!("'{}' at {}: {}", parameter, link, msg))
        }
        PolicyError::Processing(msg) => {
            PolicyError::Processing(format!("'{}' at {}: {}", parameter, link, msg))
        }
        merge => merge.for_parameter(parameter),
    }
}
