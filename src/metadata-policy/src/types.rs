//! Core metadata policy types

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Operator name as it appears in a `metadata_policy` object
pub type OperatorName = String;

/// Metadata parameter name
pub type ParameterName = String;

/// Normalized values of one metadata parameter
pub type MetadataValues = Vec<String>;

/// Raw `metadata_policy` content of a single statement:
/// parameter name → operator name → raw operator value
pub type RawMetadataPolicy = BTreeMap<ParameterName, BTreeMap<OperatorName, Value>>;

/// Declared shape of a metadata parameter or policy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Boolean,
    StringArray,
    IntegerArray,
}

impl ValueType {
    /// Whether values of this type are sequences
    pub fn is_array(self) -> bool {
        matches!(self, Self::StringArray | Self::IntegerArray)
    }

    /// Array type used for set-valued operators on a parameter of this type
    ///
    /// Booleans have no array form.
    pub fn array_type(self) -> Result<Self> {
        match self {
            Self::String | Self::StringArray => Ok(Self::StringArray),
            Self::Integer | Self::IntegerArray => Ok(Self::IntegerArray),
            Self::Boolean => Err(PolicyError::Processing(
                "boolean values have no array form".to_string(),
            )),
        }
    }

    /// Scalar type of the elements of this type
    pub fn element_type(self) -> Self {
        match self {
            Self::StringArray => Self::String,
            Self::IntegerArray => Self::Integer,
            scalar => scalar,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringArray => "string_array",
            Self::IntegerArray => "integer_array",
        };
        write!(f, "{}", name)
    }
}

/// Well-known OpenID Connect and Federation metadata parameters
const WELL_KNOWN_PARAMETERS: &[(&str, ValueType)] = &[
    ("application_type", ValueType::String),
    ("client_name", ValueType::String),
    ("client_registration_types", ValueType::StringArray),
    ("contacts", ValueType::StringArray),
    ("default_acr_values", ValueType::StringArray),
    ("default_max_age", ValueType::Integer),
    ("grant_types", ValueType::StringArray),
    ("id_token_encrypted_response_alg", ValueType::String),
    ("id_token_signed_response_alg", ValueType::String),
    ("jwks_uri", ValueType::String),
    ("organization_name", ValueType::String),
    ("post_logout_redirect_uris", ValueType::StringArray),
    ("redirect_uris", ValueType::StringArray),
    ("request_object_signing_alg", ValueType::String),
    ("require_auth_time", ValueType::Boolean),
    ("require_pushed_authorization_requests", ValueType::Boolean),
    ("response_types", ValueType::StringArray),
    ("scope", ValueType::String),
    ("subject_type", ValueType::String),
    ("token_endpoint_auth_method", ValueType::String),
    ("token_endpoint_auth_signing_alg", ValueType::String),
    ("userinfo_signed_response_alg", ValueType::String),
];

/// Registry of declared metadata parameter types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterTypes {
    types: BTreeMap<ParameterName, ValueType>,
    fallback: Option<ValueType>,
}

impl ParameterTypes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with well-known OpenID Connect parameters
    pub fn well_known() -> Self {
        let types = WELL_KNOWN_PARAMETERS
            .iter()
            .map(|(name, value_type)| (name.to_string(), *value_type))
            .collect();
        Self { types, fallback: None }
    }

    /// Declare the type of a parameter
    pub fn with_type(mut self, parameter: impl Into<String>, value_type: ValueType) -> Self {
        self.types.insert(parameter.into(), value_type);
        self
    }

    /// Type used for parameters that were never declared
    pub fn with_fallback(mut self, value_type: Option<ValueType>) -> Self {
        self.fallback = value_type;
        self
    }

    /// Declare a parameter type in place
    pub fn insert(&mut self, parameter: impl Into<String>, value_type: ValueType) {
        self.types.insert(parameter.into(), value_type);
    }

    /// Resolve the declared type of a parameter
    pub fn value_type(&self, parameter: &str) -> Result<ValueType> {
        self.types
            .get(parameter)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| {
                PolicyError::Processing(format!(
                    "No value type declared for metadata parameter '{}'",
                    parameter
                ))
            })
    }
}

/// One statement of a trust chain, reduced to its metadata policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Issuer of the statement (e.g., "https://anchor.example.org")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// `metadata_policy` of the statement
    #[serde(default)]
    pub metadata_policy: RawMetadataPolicy,
}

impl ChainLink {
    /// Create an empty link
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the issuer of the statement
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Add a raw operator value for a parameter
    pub fn with_operator(
        mut self,
        parameter: impl Into<String>,
        operator: impl Into<String>,
        value: Value,
    ) -> Self {
        self.metadata_policy
            .entry(parameter.into())
            .or_default()
            .insert(operator.into(), value);
        self
    }

    /// Build a link from a `metadata_policy` JSON object
    pub fn from_json(issuer: Option<String>, metadata_policy: &Value) -> Result<Self> {
        let metadata_policy = serde_json::from_value(metadata_policy.clone()).map_err(|e| {
            PolicyError::Translation(format!("Malformed metadata_policy object: {}", e))
        })?;
        Ok(Self { issuer, metadata_policy })
    }
}
