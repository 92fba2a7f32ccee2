use tracing::debug;
use xs2a_model::{AuthorisationFlow, ScaApproach};

use crate::cms::ServiceBackends;
use crate::error::{Error, Result};
use crate::scope::RequestScope;

/// Resolves the approach bound to an existing authorisation
///
/// Queried on every stage-dependent request: the approach can change once
/// mid-flow, so it is never cached.
#[derive(Debug, Clone)]
pub struct ApproachResolver {
    backends: ServiceBackends,
}

impl ApproachResolver {
    pub fn new(backends: ServiceBackends) -> Self {
        Self { backends }
    }

    /// Approach of `authorisation_id`.
    ///
    /// A forced approach on the scope wins and is consumed. Otherwise the
    /// backend owning the scope's service type is asked; a missing approach
    /// is `NotFound`.
    pub async fn resolve(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
        scope: &mut RequestScope,
    ) -> Result<ScaApproach> {
        if let Some(forced) = scope.take_forced_approach() {
            debug!(
                authorisation_id = %authorisation_id,
                approach = %forced,
                "Using forced SCA approach"
            );
            return Ok(forced);
        }

        let backend = self.backends.for_service(scope.service_type());
        let approach = backend
            .get_sca_approach(authorisation_id, flow)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No SCA approach stored for {} authorisation {}",
                    flow, authorisation_id
                ))
            })?;

        debug!(
            authorisation_id = %authorisation_id,
            approach = %approach,
            "Resolved SCA approach"
        );
        Ok(approach)
    }

    /// Approach of an initiation authorisation.
    pub async fn initiation_approach(
        &self,
        authorisation_id: &str,
        scope: &mut RequestScope,
    ) -> Result<ScaApproach> {
        self.resolve(authorisation_id, AuthorisationFlow::Initiation, scope)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCms;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use xs2a_model::{Authorisation, PsuIdData, ServiceType};

    fn setup() -> (Arc<InMemoryCms>, Arc<InMemoryCms>, ApproachResolver) {
        let ais = Arc::new(InMemoryCms::new());
        let pis = Arc::new(InMemoryCms::new());
        let resolver = ApproachResolver::new(ServiceBackends::new(ais.clone(), pis.clone()));
        (ais, pis, resolver)
    }

    #[tokio::test]
    async fn test_backend_chosen_by_service_type() {
        let (ais, pis, resolver) = setup();
        let consent_auth = Authorisation::new(
            "consent-1",
            ServiceType::Ais,
            AuthorisationFlow::Initiation,
            PsuIdData::empty(),
            ScaApproach::Decoupled,
        );
        let payment_auth = Authorisation::new(
            "payment-1",
            ServiceType::Pis,
            AuthorisationFlow::Cancellation,
            PsuIdData::empty(),
            ScaApproach::Embedded,
        );
        ais.insert(consent_auth.clone());
        pis.insert(payment_auth.clone());

        let mut scope = RequestScope::new(ServiceType::Ais);
        assert_eq!(
            resolver
                .initiation_approach(&consent_auth.authorisation_id, &mut scope)
                .await
                .unwrap(),
            ScaApproach::Decoupled
        );

        let mut scope = RequestScope::new(ServiceType::Pis);
        assert_eq!(
            resolver
                .resolve(
                    &payment_auth.authorisation_id,
                    AuthorisationFlow::Cancellation,
                    &mut scope
                )
                .await
                .unwrap(),
            ScaApproach::Embedded
        );

        // A consent authorisation is invisible to the PIS backend.
        let mut scope = RequestScope::new(ServiceType::Pis);
        assert_matches!(
            resolver
                .initiation_approach(&consent_auth.authorisation_id, &mut scope)
                .await,
            Err(Error::NotFound(_))
        );
    }

    #[tokio::test]
    async fn test_forced_approach_consumed_once() {
        let (_, pis, resolver) = setup();
        let auth = Authorisation::new(
            "payment-1",
            ServiceType::Pis,
            AuthorisationFlow::Initiation,
            PsuIdData::empty(),
            ScaApproach::Embedded,
        );
        pis.insert(auth.clone());

        let mut scope = RequestScope::new(ServiceType::Pis);
        scope.force_approach(ScaApproach::Decoupled);

        let first = resolver
            .initiation_approach(&auth.authorisation_id, &mut scope)
            .await
            .unwrap();
        let second = resolver
            .initiation_approach(&auth.authorisation_id, &mut scope)
            .await
            .unwrap();
        assert_eq!(first, ScaApproach::Decoupled);
        assert_eq!(second, ScaApproach::Embedded);
    }

    #[tokio::test]
    async fn test_missing_approach_is_not_guessed() {
        let (_, pis, resolver) = setup();
        let mut auth = Authorisation::new(
            "payment-1",
            ServiceType::Pis,
            AuthorisationFlow::Initiation,
            PsuIdData::empty(),
            ScaApproach::Embedded,
        );
        auth.sca_approach = None;
        pis.insert(auth.clone());

        let mut scope = RequestScope::new(ServiceType::Pis);
        assert_matches!(
            resolver
                .initiation_approach(&auth.authorisation_id, &mut scope)
                .await,
            Err(Error::NotFound(_))
        );
    }
}
