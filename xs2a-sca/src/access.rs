//! Endpoint access checks
//!
//! Before a PSU data update is dispatched the caller must be allowed to
//! touch the authorisation at all. A refusal becomes `SERVICE_BLOCKED`; a
//! check that could not be made is an error of its own.

use async_trait::async_trait;
use tracing::warn;
use xs2a_model::{AuthorisationFlow, ServiceType};

use crate::cms::ServiceBackends;
use crate::error::Result;

/// Decides whether the update endpoint may be called for an authorisation
#[async_trait]
pub trait EndpointAccessChecker: Send + Sync {
    async fn is_endpoint_accessible(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<bool>;
}

/// Blocks authorisations that already reached a terminal status
#[derive(Debug, Clone)]
pub struct StatusEndpointAccessChecker {
    backends: ServiceBackends,
}

impl StatusEndpointAccessChecker {
    pub fn new(backends: ServiceBackends) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl EndpointAccessChecker for StatusEndpointAccessChecker {
    async fn is_endpoint_accessible(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<bool> {
        for service_type in [ServiceType::Pis, ServiceType::Ais] {
            let backend = self.backends.for_service(service_type);
            let loaded = backend
                .get_authorisation(authorisation_id, flow)
                .await
                .map_err(|e| {
                    warn!(
                        authorisation_id = %authorisation_id,
                        "Access check could not load authorisation: {}", e
                    );
                    e
                })?;
            if let Some(authorisation) = loaded {
                return Ok(!authorisation.sca_status.is_terminal());
            }
        }
        // Unknown authorisations are reported as RESOURCE_UNKNOWN later on.
        Ok(true)
    }
}

/// Checker that never blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccessChecker;

#[async_trait]
impl EndpointAccessChecker for AllowAllAccessChecker {
    async fn is_endpoint_accessible(&self, _: &str, _: AuthorisationFlow) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{AuthorisationBackend, CmsError};
    use crate::error::Error;
    use crate::memory::InMemoryCms;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use xs2a_model::{Authorisation, PsuIdData, ScaApproach, ScaStatus, TransitionResult};

    struct UnreachableCms;

    #[async_trait]
    impl AuthorisationBackend for UnreachableCms {
        async fn get_authorisation(
            &self,
            _: &str,
            _: AuthorisationFlow,
        ) -> std::result::Result<Option<Authorisation>, CmsError> {
            Err(CmsError::Unavailable("connection refused".to_string()))
        }

        async fn get_sca_approach(
            &self,
            _: &str,
            _: AuthorisationFlow,
        ) -> std::result::Result<Option<ScaApproach>, CmsError> {
            Err(CmsError::Unavailable("connection refused".to_string()))
        }

        async fn save_transition(
            &self,
            _: &str,
            _: AuthorisationFlow,
            _: &TransitionResult,
        ) -> std::result::Result<(), CmsError> {
            Err(CmsError::Unavailable("connection refused".to_string()))
        }

        async fn create_authorisation(
            &self,
            _: Authorisation,
        ) -> std::result::Result<Authorisation, CmsError> {
            Err(CmsError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let checker = StatusEndpointAccessChecker::new(ServiceBackends::shared(Arc::new(
            UnreachableCms,
        )));
        assert_matches!(
            checker
                .is_endpoint_accessible("auth-1", AuthorisationFlow::Initiation)
                .await,
            Err(Error::Backend(_))
        );
    }

    #[tokio::test]
    async fn test_terminal_status_blocks() {
        let cms = Arc::new(InMemoryCms::new());
        let mut finalised = Authorisation::new(
            "consent-1",
            ServiceType::Ais,
            AuthorisationFlow::Initiation,
            PsuIdData::empty(),
            ScaApproach::Embedded,
        );
        finalised.sca_status = ScaStatus::Finalised;
        let open = Authorisation::new(
            "consent-2",
            ServiceType::Ais,
            AuthorisationFlow::Initiation,
            PsuIdData::empty(),
            ScaApproach::Embedded,
        );
        cms.insert(finalised.clone());
        cms.insert(open.clone());

        let checker = StatusEndpointAccessChecker::new(ServiceBackends::new(
            cms,
            Arc::new(InMemoryCms::new()),
        ));
        assert!(
            !checker
                .is_endpoint_accessible(&finalised.authorisation_id, AuthorisationFlow::Initiation)
                .await
                .unwrap()
        );
        assert!(
            checker
                .is_endpoint_accessible(&open.authorisation_id, AuthorisationFlow::Initiation)
                .await
                .unwrap()
        );
        assert!(
            checker
                .is_endpoint_accessible("unknown", AuthorisationFlow::Initiation)
                .await
                .unwrap()
        );
    }
}
