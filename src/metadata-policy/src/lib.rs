//! # CretoAI Metadata Policy Engine
//!
//! Merges and enforces federation metadata policies along a trust chain.
//!
//! ## Features
//!
//! - **Type normalization** of loosely-typed JSON policy and metadata values
//! - **Policy operators** `value`, `add`, `default`, `one_of`, `subset_of`,
//!   `superset_of`, `essential` and `regexp`
//! - **Chain merging** from trust anchor to leaf with conflict reporting per
//!   pair of statements
//! - **Metadata application and validation** against the effective policy
//!
//! Everything here is synchronous and free of shared mutable state; merged
//! policies are `Send + Sync` and can be evaluated from any thread.
//!
//! ## Example
//!
//! ```rust
//! use cretoai_metadata_policy::{ChainLink, PolicyMerger};
//! use serde_json::json;
//!
//! let chain = vec![
//!     ChainLink::new()
//!         .with_issuer("https://anchor.example")
//!         .with_operator("id_token_signed_response_alg", "one_of", json!(["RS256", "ES256"])),
//!     ChainLink::new()
//!         .with_issuer("https://intermediate.example")
//!         .with_operator("id_token_signed_response_alg", "one_of", json!(["ES256", "PS256"])),
//! ];
//!
//! let policy = PolicyMerger::new().merge(&chain)?;
//!
//! let metadata = json!({"id_token_signed_response_alg": "ES256"});
//! assert!(policy.is_valid(metadata.as_object().unwrap())?);
//! # Ok::<(), cretoai_metadata_policy::PolicyError>(())
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod operator;
pub mod policy;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{LinkRef, MergeConflict, PolicyError, PolicyErrorKind, Result};
pub use merge::{MergeOutcome, PolicyMerger};
pub use normalize::{denormalize, normalize};
pub use operator::{Operator, OperatorValue, PolicyOperator};
pub use policy::{MetadataPolicy, ParameterPolicy, Violation};
pub use types::{ChainLink, MetadataValues, ParameterTypes, RawMetadataPolicy, ValueType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
