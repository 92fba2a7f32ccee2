//! Error classification handed to the transport layer.
//!
//! The core only classifies; turning an [`ErrorHolder`] into an HTTP
//! envelope is the job of the transport's error mapper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// XS2A message error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageErrorCode {
    /// Missing or malformed PSU data.
    FormatError,
    /// The authentication provider rejected credentials or the SCA code.
    PsuCredentialsInvalid,
    /// Unknown authorisation or resource id.
    ResourceUnknown,
    /// The endpoint may not be used for this authorisation any more.
    ServiceBlocked,
    /// The requested operation is not offered for the authorisation's approach.
    ServiceInvalid,
    /// A backend or provider failure.
    InternalServerError,
}

impl MessageErrorCode {
    pub fn name(&self) -> &'static str {
        match self {
            MessageErrorCode::FormatError => "FORMAT_ERROR",
            MessageErrorCode::PsuCredentialsInvalid => "PSU_CREDENTIALS_INVALID",
            MessageErrorCode::ResourceUnknown => "RESOURCE_UNKNOWN",
            MessageErrorCode::ServiceBlocked => "SERVICE_BLOCKED",
            MessageErrorCode::ServiceInvalid => "SERVICE_INVALID",
            MessageErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for MessageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An error code plus the TPP-facing message texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHolder {
    pub error_code: MessageErrorCode,

    #[serde(default)]
    pub messages: Vec<String>,
}

impl ErrorHolder {
    pub fn new(error_code: MessageErrorCode) -> Self {
        Self {
            error_code,
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

impl fmt::Display for ErrorHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            write!(f, "{}", self.error_code)
        } else {
            write!(f, "{}: {}", self.error_code, self.messages.join("; "))
        }
    }
}
