//! Stage dispatch
//!
//! A PSU data update is handled by the stage registered for the
//! authorisation's service, flow, approach and current status:
//!
//! ```text
//!   StageKey { PIS, CANCELLATION, EMBEDDED, psuAuthenticated }
//!        │
//!        ▼
//!   StageRegistry::dispatch ──▶ StageHandler::PsuAuthenticated
//!                                      │ apply(approach = EMBEDDED)
//!                                      ▼
//!                               TransitionResult
//! ```
//!
//! Only embedded and decoupled authorisations have stages. Redirect and
//! OAuth authorisations are driven by the ASPSP's own pages, and terminal
//! statuses accept no further updates, so neither is ever registered.

mod decoupled;
mod method_selected;
mod psu_authenticated;
mod received;

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error};
use xs2a_model::domain::psu::first_present;
use xs2a_model::{
    Authorisation, AuthorisationFlow, ErrorHolder, MessageErrorCode, PsuIdData, ScaApproach,
    ScaStatus, ServiceType, TransitionResult, UpdatePsuDataRequest,
};

use crate::error::{Error, Result};
use crate::spi::{AuthenticationProvider, SpiContext};

// ---------------------------------------------------------------------------
// Stage Keys
// ---------------------------------------------------------------------------

/// Lookup key of a stage handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageKey {
    pub service: ServiceType,
    pub flow: AuthorisationFlow,
    pub approach: ScaApproach,
    pub status: ScaStatus,
}

impl StageKey {
    pub fn new(
        service: ServiceType,
        flow: AuthorisationFlow,
        approach: ScaApproach,
        status: ScaStatus,
    ) -> Self {
        Self {
            service,
            flow,
            approach,
            status,
        }
    }
}

/// Renders the key as `PIS_EMBEDDED_RECEIVED` or
/// `PIS_CANCELLATION_DECOUPLED_PSUAUTHENTICATED`.
impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_", self.service)?;
        if self.flow == AuthorisationFlow::Cancellation {
            write!(f, "{}_", self.flow)?;
        }
        write!(f, "{}_{}", self.approach, self.status.name())
    }
}

// ---------------------------------------------------------------------------
// Stage Handlers
// ---------------------------------------------------------------------------

/// Collaborators a stage needs while it runs.
pub struct StageServices<'a> {
    pub provider: &'a dyn AuthenticationProvider,
    pub context: &'a SpiContext,
}

/// One handler per status; the approach is passed to [`StageHandler::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageHandler {
    /// Identify the PSU, or check the PSU's password.
    Received,
    /// Check the PSU's password.
    PsuIdentified,
    /// List or select an SCA method.
    PsuAuthenticated,
    /// Verify the authentication code, or report the pending decoupled SCA.
    ScaMethodSelected,
}

impl StageHandler {
    /// Handler for a status; terminal statuses have none.
    pub fn for_status(status: ScaStatus) -> Option<Self> {
        match status {
            ScaStatus::Received => Some(StageHandler::Received),
            ScaStatus::PsuIdentified => Some(StageHandler::PsuIdentified),
            ScaStatus::PsuAuthenticated => Some(StageHandler::PsuAuthenticated),
            ScaStatus::ScaMethodSelected => Some(StageHandler::ScaMethodSelected),
            ScaStatus::Finalised | ScaStatus::Failed => None,
        }
    }

    /// Run the stage.
    ///
    /// Never fails: every problem is reported as an error on the result,
    /// with the status the authorisation already had.
    pub async fn apply(
        &self,
        services: &StageServices<'_>,
        approach: ScaApproach,
        request: &UpdatePsuDataRequest,
        authorisation: &Authorisation,
    ) -> TransitionResult {
        match self {
            StageHandler::Received => {
                received::apply_received(services, approach, request, authorisation).await
            }
            StageHandler::PsuIdentified => {
                received::authorise_psu(services, approach, request, authorisation).await
            }
            StageHandler::PsuAuthenticated => {
                psu_authenticated::apply(services, approach, request, authorisation).await
            }
            StageHandler::ScaMethodSelected => {
                method_selected::apply(services, approach, request, authorisation).await
            }
        }
    }
}

/// PSU data sent with the request, falling back to the stored PSU.
fn psu_of(request: &UpdatePsuDataRequest, authorisation: &Authorisation) -> PsuIdData {
    first_present(&[&request.psu_data, &authorisation.psu_data])
        .cloned()
        .unwrap_or_default()
}

/// `FORMAT_ERROR` result keeping the current status.
fn format_error(message: &str, authorisation: &Authorisation, psu: PsuIdData) -> TransitionResult {
    rejected(Error::Validation(message.to_string()), authorisation, psu)
}

/// Failed result keeping the current status, classified for the TPP.
fn rejected(err: Error, authorisation: &Authorisation, psu: PsuIdData) -> TransitionResult {
    let holder = err.to_error_holder().unwrap_or_else(|| {
        ErrorHolder::new(MessageErrorCode::InternalServerError).with_message(err.to_string())
    });
    TransitionResult::failed(holder, authorisation.sca_status, psu)
}

impl fmt::Display for StageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageHandler::Received => write!(f, "received"),
            StageHandler::PsuIdentified => write!(f, "psu_identified"),
            StageHandler::PsuAuthenticated => write!(f, "psu_authenticated"),
            StageHandler::ScaMethodSelected => write!(f, "sca_method_selected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage Registry
// ---------------------------------------------------------------------------

/// Service and flow combinations that have stages.
pub const STAGED_FLOWS: [(ServiceType, AuthorisationFlow); 3] = [
    (ServiceType::Ais, AuthorisationFlow::Initiation),
    (ServiceType::Pis, AuthorisationFlow::Initiation),
    (ServiceType::Pis, AuthorisationFlow::Cancellation),
];

/// Registry of stage handlers. Built at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: HashMap<StageKey, StageHandler>,
}

impl StageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a handler for every staged flow, embedded and
    /// decoupled approach, and non-terminal status.
    pub fn with_default_stages() -> Self {
        let mut registry = Self::new();
        for (service, flow) in STAGED_FLOWS {
            for approach in [ScaApproach::Embedded, ScaApproach::Decoupled] {
                for status in ScaStatus::ALL {
                    if let Some(handler) = StageHandler::for_status(status) {
                        registry.register(StageKey::new(service, flow, approach, status), handler);
                    }
                }
            }
        }
        registry
    }

    /// Register a handler, returning the one it replaced.
    pub fn register(&mut self, key: StageKey, handler: StageHandler) -> Option<StageHandler> {
        self.stages.insert(key, handler)
    }

    pub fn contains(&self, key: &StageKey) -> bool {
        self.stages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Handler for `key`.
    pub fn dispatch(&self, key: &StageKey) -> Result<StageHandler> {
        match self.stages.get(key) {
            Some(handler) => {
                debug!(stage = %key, handler = %handler, "Dispatching stage");
                Ok(*handler)
            }
            None => {
                error!(stage = %key, "No stage handler registered");
                Err(Error::UnsupportedStageConfiguration(key.to_string()))
            }
        }
    }

    /// Check that every staged flow has a handler for every non-terminal
    /// status of each configured approach that has stages.
    pub fn verify_coverage(&self, approaches: &[ScaApproach]) -> Result<()> {
        let mut missing = Vec::new();
        for (service, flow) in STAGED_FLOWS {
            for approach in approaches.iter().filter(|a| a.has_embedded_stages()) {
                for status in ScaStatus::ALL.iter().filter(|s| !s.is_terminal()) {
                    let key = StageKey::new(service, flow, *approach, *status);
                    if !self.contains(&key) {
                        missing.push(key.to_string());
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "Missing stage handlers: {}",
                missing.join(", ")
            )))
        }
    }
}
