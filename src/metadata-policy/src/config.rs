//! Engine configuration loading and validation

use crate::types::{ParameterTypes, ValueType};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata policy engine configuration
///
/// ```toml
/// ignore_unknown_operators = false
/// fallback_value_type = "string"
///
/// [parameter_types]
/// software_statement_types = "string_array"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Skip operators this engine does not implement instead of failing
    #[serde(default)]
    pub ignore_unknown_operators: bool,

    /// Type assumed for parameters that are not declared anywhere
    #[serde(default)]
    pub fallback_value_type: Option<ValueType>,

    /// Parameter types in addition to the well-known ones
    #[serde(default)]
    pub parameter_types: BTreeMap<String, ValueType>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .context("Failed to read configuration file")?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(contents).context("Failed to parse configuration file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.parameter_types.keys().any(|name| name.trim().is_empty()) {
            bail!("parameter_types contains an empty parameter name");
        }

        Ok(())
    }

    /// Parameter type registry described by this configuration
    pub fn parameter_types(&self) -> ParameterTypes {
        let mut types = ParameterTypes::well_known().with_fallback(self.fallback_value_type);
        for (name, value_type) in &self.parameter_types {
            types.insert(name.clone(), *value_type);
        }
        types
    }
}
