//! Authorisation records and the values they are built from.

use crate::domain::psu::PsuIdData;
use crate::domain::sca::{ScaApproach, ScaStatus};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// XS2A service domain an authorisation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    /// Account information (consents).
    Ais,
    /// Payment initiation (payments and payment cancellations).
    Pis,
}

impl ServiceType {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceType::Ais => "AIS",
            ServiceType::Pis => "PIS",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AIS" => Ok(ServiceType::Ais),
            "PIS" => Ok(ServiceType::Pis),
            _ => Err(Error::UnknownServiceType(s.to_string())),
        }
    }
}

/// Whether an authorisation authorises the resource itself or its
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorisationFlow {
    Initiation,
    Cancellation,
}

impl AuthorisationFlow {
    pub fn name(&self) -> &'static str {
        match self {
            AuthorisationFlow::Initiation => "INITIATION",
            AuthorisationFlow::Cancellation => "CANCELLATION",
        }
    }
}

impl fmt::Display for AuthorisationFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AuthorisationFlow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INITIATION" | "CREATED" => Ok(AuthorisationFlow::Initiation),
            "CANCELLATION" | "CANCELLED" => Ok(AuthorisationFlow::Cancellation),
            _ => Err(Error::UnknownAuthorisationFlow(s.to_string())),
        }
    }
}

/// An SCA method offered to the PSU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationObject {
    /// Type of the method, e.g. `SMS_OTP`, `CHIP_OTP`, `PUSH_OTP`.
    pub authentication_type: String,

    /// Version of the method, if the ASPSP versions its methods.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authentication_version: Option<String>,

    /// Identifier the TPP uses to select this method.
    pub authentication_method_id: String,

    /// Human readable name shown to the PSU.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub explanation: Option<String>,

    /// Methods that can only be confirmed out-of-band (in a bank app).
    /// Selecting one switches an embedded authorisation to decoupled.
    #[serde(default)]
    pub decoupled: bool,
}

impl AuthenticationObject {
    pub fn new(authentication_type: &str, authentication_method_id: &str) -> Self {
        Self {
            authentication_type: authentication_type.to_string(),
            authentication_version: None,
            authentication_method_id: authentication_method_id.to_string(),
            name: None,
            explanation: None,
            decoupled: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Mark this method as decoupled-only.
    pub fn decoupled(mut self) -> Self {
        self.decoupled = true;
        self
    }
}

/// Format of the one-time password the PSU is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpFormat {
    Characters,
    Integer,
}

/// Data the PSU needs to produce an authentication code for an embedded method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeData {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub otp_max_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub otp_format: Option<OtpFormat>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub additional_information: Option<String>,
}

/// The resource an authorisation belongs to, as seen by path building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceRef {
    /// An AIS consent.
    #[serde(rename_all = "camelCase")]
    Consent { consent_id: String },

    /// A payment, addressed by service (`payments`, `bulk-payments`,
    /// `periodic-payments`) and product (`sepa-credit-transfers`, ...).
    #[serde(rename_all = "camelCase")]
    Payment {
        payment_service: String,
        payment_product: String,
        payment_id: String,
    },
}

impl ResourceRef {
    pub fn consent(consent_id: &str) -> Self {
        ResourceRef::Consent {
            consent_id: consent_id.to_string(),
        }
    }

    pub fn payment(payment_service: &str, payment_product: &str, payment_id: &str) -> Self {
        ResourceRef::Payment {
            payment_service: payment_service.to_string(),
            payment_product: payment_product.to_string(),
            payment_id: payment_id.to_string(),
        }
    }

    /// Identifier of the consent or payment.
    pub fn resource_id(&self) -> &str {
        match self {
            ResourceRef::Consent { consent_id } => consent_id,
            ResourceRef::Payment { payment_id, .. } => payment_id,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        match self {
            ResourceRef::Consent { .. } => ServiceType::Ais,
            ResourceRef::Payment { .. } => ServiceType::Pis,
        }
    }
}

/// One SCA attempt for exactly one payment or consent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorisation {
    pub authorisation_id: String,

    /// Id of the owning payment or consent.
    pub resource_id: String,

    pub service_type: ServiceType,

    pub flow: AuthorisationFlow,

    pub sca_status: ScaStatus,

    /// Unset only until the approach has been resolved for a new record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_approach: Option<ScaApproach>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chosen_sca_method: Option<AuthenticationObject>,

    #[serde(default)]
    pub available_sca_methods: Vec<AuthenticationObject>,

    #[serde(default)]
    pub psu_data: PsuIdData,

    /// Opaque payment/consent body handed to the authentication provider.
    #[serde(default)]
    pub payload: serde_json::Value,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Authorisation {
    /// Create a fresh authorisation in the `received` status.
    pub fn new(
        resource_id: &str,
        service_type: ServiceType,
        flow: AuthorisationFlow,
        psu_data: PsuIdData,
        sca_approach: ScaApproach,
    ) -> Self {
        let now = Utc::now();
        Self {
            authorisation_id: Uuid::new_v4().to_string(),
            resource_id: resource_id.to_string(),
            service_type,
            flow,
            sca_status: ScaStatus::Received,
            sca_approach: Some(sca_approach),
            chosen_sca_method: None,
            available_sca_methods: Vec::new(),
            psu_data,
            payload: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Look up one of the offered SCA methods by id.
    pub fn find_sca_method(&self, method_id: &str) -> Option<&AuthenticationObject> {
        self.available_sca_methods
            .iter()
            .find(|m| m.authentication_method_id == method_id)
    }
}
