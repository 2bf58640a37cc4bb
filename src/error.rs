//! Error types for the UTMi valuation engine
//!
//! Evaluation itself never fails: classifiers, the valuation engine, the CV
//! model, the income projection and the aggregator all degrade to safe
//! defaults. The only error worth surfacing from the core is an invalid
//! coefficient table, rejected when it is loaded. The remaining variants
//! belong to the loading and marshalling edges.

use thiserror::Error;

/// Main error type for UTMi operations
#[derive(Error, Debug)]
pub enum UtmiError {
    /// Coefficient table failed validation (negative weight, unordered thresholds, ...)
    #[error("Invalid coefficient table: {0}")]
    InvalidCoefficients(String),

    /// Layered configuration could not be assembled
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Coefficient file is not valid TOML
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Coefficient table could not be rendered as TOML
    #[error("TOML render error: {0}")]
    TomlRender(#[from] toml::ser::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Interaction record not present in the store
    #[error("Interaction not found: {0}")]
    RecordNotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for UTMi operations
pub type Result<T> = std::result::Result<T, UtmiError>;

/// Convert anyhow::Error to UtmiError
impl From<anyhow::Error> for UtmiError {
    fn from(err: anyhow::Error) -> Self {
        UtmiError::Other(err.to_string())
    }
}
