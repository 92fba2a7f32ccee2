//! Error handling for the SCA core

use thiserror::Error;
use xs2a_model::{ErrorHolder, MessageErrorCode};

use crate::cms::CmsError;
use crate::spi::SpiError;

/// Error types for the SCA core
///
/// Most variants are expected outcomes of a PSU data update and are turned
/// into an [`ErrorHolder`] on the response. `UnsupportedStageConfiguration`
/// and `Configuration` describe a broken deployment and are returned as
/// `Err` to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Request data is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The authentication provider rejected the PSU's credentials
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Authorisation or approach not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The endpoint may not be called for this authorisation
    #[error("Access blocked: {0}")]
    AccessBlocked(String),

    /// The service cannot be used for this resource or approach
    #[error("Service invalid: {0}")]
    ServiceInvalid(String),

    /// An internal consistency check failed
    #[error("Internal error: {0}")]
    Internal(String),

    /// No stage handler registered for a key
    #[error("Unsupported stage configuration: {0}")]
    UnsupportedStageConfiguration(String),

    /// Consent management or authentication provider failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns true for errors that must surface as `Err` instead of an
    /// error holder on the response.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedStageConfiguration(_) | Error::Configuration(_)
        )
    }

    /// Classify the error for the TPP.
    ///
    /// Returns `None` for fatal errors.
    pub fn to_error_holder(&self) -> Option<ErrorHolder> {
        let (code, message) = match self {
            Error::Validation(msg) => (MessageErrorCode::FormatError, msg),
            Error::AuthenticationRejected(msg) => (MessageErrorCode::PsuCredentialsInvalid, msg),
            Error::NotFound(msg) => (MessageErrorCode::ResourceUnknown, msg),
            Error::AccessBlocked(msg) => (MessageErrorCode::ServiceBlocked, msg),
            Error::ServiceInvalid(msg) => (MessageErrorCode::ServiceInvalid, msg),
            Error::Backend(msg) | Error::Internal(msg) => {
                (MessageErrorCode::InternalServerError, msg)
            }
            Error::UnsupportedStageConfiguration(_) | Error::Configuration(_) => return None,
        };
        Some(ErrorHolder::new(code).with_message(message.as_str()))
    }
}

/// Result type for the SCA core
pub type Result<T> = std::result::Result<T, Error>;

impl From<xs2a_model::Error> for Error {
    fn from(err: xs2a_model::Error) -> Self {
        Error::Validation(err.to_string())
    }
}

impl From<CmsError> for Error {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::NotFound(msg) => Error::NotFound(msg),
            other => Error::Backend(other.to_string()),
        }
    }
}

impl From<SpiError> for Error {
    fn from(err: SpiError) -> Self {
        match err {
            SpiError::CredentialsInvalid(msg) => Error::AuthenticationRejected(msg),
            SpiError::Format(msg) => Error::Validation(msg),
            SpiError::ResourceUnknown(msg) => Error::NotFound(msg),
            SpiError::Unavailable(msg) => Error::Backend(msg),
        }
    }
}
