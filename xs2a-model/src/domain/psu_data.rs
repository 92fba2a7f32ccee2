//! Requests and responses of the authorisation operations.

use crate::domain::authorisation::{
    AuthenticationObject, AuthorisationFlow, ChallengeData, ResourceRef,
};
use crate::domain::links::Links;
use crate::domain::psu::PsuIdData;
use crate::domain::sca::{ScaApproach, ScaStatus};
use crate::domain::tpp_message::ErrorHolder;
use serde::{Deserialize, Serialize};

/// Start a new authorisation for a payment, a payment cancellation or a
/// consent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorisationRequest {
    pub resource: ResourceRef,

    pub flow: AuthorisationFlow,

    #[serde(default)]
    pub psu_data: PsuIdData,

    /// Resource body forwarded to the authentication provider.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CreateAuthorisationRequest {
    pub fn new(resource: ResourceRef, flow: AuthorisationFlow, psu_data: PsuIdData) -> Self {
        Self {
            resource,
            flow,
            psu_data,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorisationResponse {
    pub resource_id: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authorisation_id: Option<String>,

    /// Unset when no authorisation was created.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_status: Option<ScaStatus>,

    pub sca_approach: ScaApproach,

    #[serde(default)]
    pub links: Links,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorHolder>,
}

impl CreateAuthorisationResponse {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Update PSU data of an existing authorisation: identification, password,
/// SCA method selection or authentication code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePsuDataRequest {
    pub resource: ResourceRef,

    pub authorisation_id: String,

    pub flow: AuthorisationFlow,

    #[serde(default)]
    pub psu_data: PsuIdData,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authentication_method_id: Option<String>,

    /// The authentication code (OTP) entered by the PSU.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_authentication_data: Option<String>,

    /// Set when the request only identifies the PSU, without credentials.
    #[serde(default)]
    pub update_psu_identification: bool,
}

impl UpdatePsuDataRequest {
    pub fn new(resource: ResourceRef, authorisation_id: &str, flow: AuthorisationFlow) -> Self {
        Self {
            resource,
            authorisation_id: authorisation_id.to_string(),
            flow,
            psu_data: PsuIdData::empty(),
            password: None,
            authentication_method_id: None,
            sca_authentication_data: None,
            update_psu_identification: false,
        }
    }

    /// Identify the PSU only.
    pub fn identification(mut self, psu_data: PsuIdData) -> Self {
        self.psu_data = psu_data;
        self.update_psu_identification = true;
        self
    }

    /// Authenticate the PSU with a password.
    pub fn authentication(mut self, psu_data: PsuIdData, password: &str) -> Self {
        self.psu_data = psu_data;
        self.password = Some(password.to_string());
        self
    }

    pub fn select_method(mut self, authentication_method_id: &str) -> Self {
        self.authentication_method_id = Some(authentication_method_id.to_string());
        self
    }

    pub fn authentication_code(mut self, code: &str) -> Self {
        self.sca_authentication_data = Some(code.to_string());
        self
    }

    pub fn resource_id(&self) -> &str {
        self.resource.resource_id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePsuDataResponse {
    pub resource_id: String,

    pub authorisation_id: String,

    /// Unset when the authorisation could not be loaded.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_status: Option<ScaStatus>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chosen_sca_method: Option<AuthenticationObject>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_sca_methods: Vec<AuthenticationObject>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub challenge_data: Option<ChallengeData>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_message: Option<String>,

    #[serde(default)]
    pub links: Links,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorHolder>,
}

impl UpdatePsuDataResponse {
    /// Response carrying only an error.
    pub fn error(
        resource_id: &str,
        authorisation_id: &str,
        sca_status: Option<ScaStatus>,
        error: ErrorHolder,
    ) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            authorisation_id: authorisation_id.to_string(),
            sca_status,
            chosen_sca_method: None,
            available_sca_methods: Vec::new(),
            challenge_data: None,
            psu_message: None,
            links: Links::new(),
            error: Some(error),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaStatusResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_status: Option<ScaStatus>,

    #[serde(default)]
    pub links: Links,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorHolder>,
}
