//! Error types for the contract-data core
//!
//! Not-found is never an error here: upstream 404s surface as `None` or empty
//! collections. These types cover the failures a caller has to see.

use thiserror::Error;

/// Main error type for contract aggregation, resolution and validation
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Data format error: {0}")]
    DataFormat(#[from] DataFormatError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures talking to an upstream service
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} client could not be built: {message}")]
    Client {
        service: &'static str,
        message: String,
    },
}

/// A value that should have been a date (or similar) but could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field '{field}' has value '{value}', expected {expected}")]
pub struct DataFormatError {
    pub field: String,
    pub value: String,
    pub expected: &'static str,
}

impl DataFormatError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }
}

/// Configuration errors raised while building clients from the environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} not set")]
    MissingVar(&'static str),

    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidVar { var: &'static str, value: String },
}

pub type Result<T, E = ContractError> = std::result::Result<T, E>;
