//! Result of applying one stage to an authorisation.

use crate::domain::authorisation::{AuthenticationObject, ChallengeData};
use crate::domain::psu::PsuIdData;
use crate::domain::sca::{ScaApproach, ScaStatus};
use crate::domain::tpp_message::ErrorHolder;
use serde::{Deserialize, Serialize};

/// Outcome of a stage handler.
///
/// A result with an error leaves the authorisation untouched: the status is
/// the one the authorisation already had and nothing gets persisted. A
/// result without an error is written back to the backend as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    pub sca_status: ScaStatus,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chosen_sca_method: Option<AuthenticationObject>,

    #[serde(default)]
    pub available_sca_methods: Vec<AuthenticationObject>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub challenge_data: Option<ChallengeData>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_message: Option<String>,

    /// PSU data to store against the authorisation.
    #[serde(default)]
    pub psu_data: PsuIdData,

    /// Set only when the stage switched the authorisation's approach.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sca_approach: Option<ScaApproach>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorHolder>,
}

impl TransitionResult {
    /// A successful transition to `sca_status`.
    pub fn status(sca_status: ScaStatus, psu_data: PsuIdData) -> Self {
        Self {
            sca_status,
            chosen_sca_method: None,
            available_sca_methods: Vec::new(),
            challenge_data: None,
            psu_message: None,
            psu_data,
            sca_approach: None,
            error: None,
        }
    }

    /// A failed transition; `current_status` is kept.
    pub fn failed(error: ErrorHolder, current_status: ScaStatus, psu_data: PsuIdData) -> Self {
        Self {
            error: Some(error),
            ..Self::status(current_status, psu_data)
        }
    }

    pub fn with_chosen_method(mut self, method: AuthenticationObject) -> Self {
        self.chosen_sca_method = Some(method);
        self
    }

    pub fn with_available_methods(mut self, methods: Vec<AuthenticationObject>) -> Self {
        self.available_sca_methods = methods;
        self
    }

    pub fn with_challenge_data(mut self, challenge_data: Option<ChallengeData>) -> Self {
        self.challenge_data = challenge_data;
        self
    }

    pub fn with_psu_message(mut self, message: Option<String>) -> Self {
        self.psu_message = message;
        self
    }

    pub fn with_approach_switch(mut self, approach: ScaApproach) -> Self {
        self.sca_approach = Some(approach);
        self
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
