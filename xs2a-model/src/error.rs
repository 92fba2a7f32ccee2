//! Error types for the xs2a-model crate.

use std::result;
use thiserror::Error;

/// Errors raised while parsing or converting XS2A model values.
#[derive(Debug, Error)]
pub enum Error {
    /// A string could not be parsed as an SCA status.
    #[error("Unknown SCA status: {0}")]
    UnknownScaStatus(String),

    /// A string could not be parsed as an SCA approach.
    #[error("Unknown SCA approach: {0}")]
    UnknownScaApproach(String),

    /// A string could not be parsed as a service type.
    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    /// A string could not be parsed as an authorisation flow.
    #[error("Unknown authorisation flow: {0}")]
    UnknownAuthorisationFlow(String),

    /// Error related to serialization/deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

/// Custom Result type for XS2A model operations.
pub type Result<T> = result::Result<T, Error>;
