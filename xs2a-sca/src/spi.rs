//! Authentication provider interface (SPI)
//!
//! The ASPSP's own authentication backend performs the actual SCA: it checks
//! the PSU's static credentials, lists SCA methods, sends OTPs and verifies
//! them. Every call carries an [`SpiContext`] and no session state; the SCA
//! core only reacts to the outcome.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use xs2a_model::{
    AuthenticationObject, AuthorisationFlow, ChallengeData, PsuIdData, ScaStatus, ServiceType,
};

/// Request context handed to every SPI call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiContext {
    /// Id of the XS2A request, for correlation in the provider's logs
    pub request_id: Uuid,
    pub psu_data: PsuIdData,
    pub service_type: ServiceType,
    pub flow: AuthorisationFlow,
    pub authorisation_id: String,
}

impl SpiContext {
    pub fn new(
        request_id: Uuid,
        psu_data: PsuIdData,
        service_type: ServiceType,
        flow: AuthorisationFlow,
        authorisation_id: &str,
    ) -> Self {
        Self {
            request_id,
            psu_data,
            service_type,
            flow,
            authorisation_id: authorisation_id.to_string(),
        }
    }
}

/// Failures reported by the authentication provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpiError {
    /// Password or authentication code rejected
    #[error("PSU credentials invalid: {0}")]
    CredentialsInvalid(String),

    /// The provider could not interpret the request
    #[error("Format error: {0}")]
    Format(String),

    /// The provider does not know the PSU, payment or consent
    #[error("Resource unknown: {0}")]
    ResourceUnknown(String),

    /// The provider could not be reached
    #[error("Authentication provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type for SPI calls
pub type SpiResult<T> = std::result::Result<T, SpiError>;

/// Outcome of starting a decoupled SCA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoupledScaOutcome {
    /// Status the authorisation should move to, usually `scaMethodSelected`
    pub sca_status: ScaStatus,
    /// Message telling the PSU where to confirm
    pub psu_message: Option<String>,
}

impl DecoupledScaOutcome {
    pub fn new(sca_status: ScaStatus) -> Self {
        Self {
            sca_status,
            psu_message: None,
        }
    }

    pub fn with_psu_message(mut self, message: &str) -> Self {
        self.psu_message = Some(message.to_string());
        self
    }
}

/// The ASPSP's authentication backend
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// Check the PSU's static credentials.
    async fn authorise_psu(
        &self,
        context: &SpiContext,
        psu_data: &PsuIdData,
        password: &str,
        payload: &serde_json::Value,
    ) -> SpiResult<()>;

    /// List the SCA methods available to the PSU for this resource.
    async fn request_available_sca_methods(
        &self,
        context: &SpiContext,
        payload: &serde_json::Value,
    ) -> SpiResult<Vec<AuthenticationObject>>;

    /// Trigger an authentication code (OTP) for an embedded method.
    async fn request_authorisation_code(
        &self,
        context: &SpiContext,
        authentication_method_id: &str,
        payload: &serde_json::Value,
    ) -> SpiResult<Option<ChallengeData>>;

    /// Start out-of-band confirmation, optionally with a chosen method.
    async fn start_decoupled_sca(
        &self,
        context: &SpiContext,
        authentication_method_id: Option<&str>,
        payload: &serde_json::Value,
    ) -> SpiResult<DecoupledScaOutcome>;

    /// Verify the authentication code the PSU entered.
    async fn verify_sca_authorisation(
        &self,
        context: &SpiContext,
        sca_authentication_data: &str,
        payload: &serde_json::Value,
    ) -> SpiResult<()>;
}
