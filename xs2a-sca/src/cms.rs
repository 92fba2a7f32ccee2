//! Consent management boundary
//!
//! The consent management system (CMS) owns authorisation records. The SCA
//! core reads them, asks for the approach bound to them and writes back the
//! outcome of successful stage transitions. AIS consents and PIS payments
//! may live in different backends; [`ServiceBackends`] picks the owner.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use xs2a_model::{Authorisation, AuthorisationFlow, ScaApproach, ServiceType, TransitionResult};

/// Errors reported by a consent management backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CmsError {
    /// The write would break an invariant of the stored record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No such authorisation
    #[error("Authorisation not found: {0}")]
    NotFound(String),

    /// The backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for authorisations
#[async_trait]
pub trait AuthorisationBackend: Send + Sync {
    /// Load an authorisation of the given flow.
    async fn get_authorisation(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<Authorisation>, CmsError>;

    /// Approach stored against an authorisation, if any.
    async fn get_sca_approach(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<ScaApproach>, CmsError>;

    /// Persist the outcome of a successful stage transition.
    async fn save_transition(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
        result: &TransitionResult,
    ) -> Result<(), CmsError>;

    /// Store a new authorisation and return the stored record.
    async fn create_authorisation(
        &self,
        authorisation: Authorisation,
    ) -> Result<Authorisation, CmsError>;
}

/// The AIS and PIS backends
#[derive(Clone)]
pub struct ServiceBackends {
    ais: Arc<dyn AuthorisationBackend>,
    pis: Arc<dyn AuthorisationBackend>,
}

impl ServiceBackends {
    pub fn new(ais: Arc<dyn AuthorisationBackend>, pis: Arc<dyn AuthorisationBackend>) -> Self {
        Self { ais, pis }
    }

    /// Use one backend for both services.
    pub fn shared(backend: Arc<dyn AuthorisationBackend>) -> Self {
        Self {
            ais: backend.clone(),
            pis: backend,
        }
    }

    /// The backend owning authorisations of `service_type`.
    pub fn for_service(&self, service_type: ServiceType) -> &Arc<dyn AuthorisationBackend> {
        match service_type {
            ServiceType::Ais => &self.ais,
            ServiceType::Pis => &self.pis,
        }
    }
}

impl std::fmt::Debug for ServiceBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBackends").finish_non_exhaustive()
    }
}
