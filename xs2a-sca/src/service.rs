//! # Authorisation service
//!
//! The [`AuthorisationService`] drives one TPP request through the decision
//! core:
//!
//! ```text
//!   update_psu_data
//!     │
//!     ├─▶ access check + load ────────▶ INTERNAL_SERVER_ERROR (backend down)
//!     ├─▶ access refused ─────────────▶ SERVICE_BLOCKED
//!     ├─▶ authorisation missing ──────▶ RESOURCE_UNKNOWN
//!     ├─▶ ApproachResolver::resolve
//!     ├─▶ REDIRECT / OAUTH ───────────▶ SERVICE_INVALID
//!     ├─▶ StageRegistry::dispatch ────▶ Err(UnsupportedStageConfiguration)
//!     ├─▶ StageHandler::apply
//!     ├─▶ monotonic status check ─────▶ INTERNAL_SERVER_ERROR
//!     ├─▶ save_transition (only without error)
//!     └─▶ derive_links + LinkBuilder
//! ```
//!
//! Expected failures are [`Error`] values classified by
//! [`Error::to_error_holder`] and end up as an [`ErrorHolder`] on the
//! response. Only a broken deployment (no stage for a key) is returned as
//! `Err`.
//!
//! ## Thread Safety
//!
//! The service holds no per-request state and can be shared behind an
//! `Arc`. Everything request-specific, including the one-shot approach
//! override, lives in the caller's [`RequestScope`].

use std::sync::Arc;
use tracing::{error, info, warn};
use xs2a_model::domain::psu::first_present;
use xs2a_model::{
    Authorisation, AuthorisationFlow, CreateAuthorisationRequest, CreateAuthorisationResponse,
    ErrorHolder, LinkType, Links, PsuIdData, ResourceRef, ScaStatus,
    ScaStatusResponse, ServiceType, TransitionResult, UpdatePsuDataRequest, UpdatePsuDataResponse,
};

use crate::access::{EndpointAccessChecker, StatusEndpointAccessChecker};
use crate::approach::{ApproachRegistry, ApproachResolver};
use crate::cms::ServiceBackends;
use crate::config::ScaConfig;
use crate::error::{Error, Result};
use crate::links::{derive_links, AuthorisationMethodDecider, LinkBuilder, LinkParams};
use crate::scope::RequestScope;
use crate::spi::{AuthenticationProvider, SpiContext};
use crate::stage::{StageKey, StageRegistry, StageServices};

/// Links for a payment or consent that was just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiationLinkRequest {
    pub resource: ResourceRef,
    /// Set when an authorisation was created implicitly with the resource
    pub authorisation_id: Option<String>,
    pub psu_data: PsuIdData,
    pub multilevel_sca_required: bool,
}

/// Request-scoped driver of the SCA decision core
pub struct AuthorisationService {
    approaches: ApproachRegistry,
    resolver: ApproachResolver,
    stages: StageRegistry,
    backends: ServiceBackends,
    provider: Arc<dyn AuthenticationProvider>,
    access_checker: Arc<dyn EndpointAccessChecker>,
    decider: AuthorisationMethodDecider,
    link_builder: LinkBuilder,
}

impl AuthorisationService {
    /// Create a service with the default stages.
    ///
    /// Fails if the configuration is invalid or a configured approach lacks
    /// stage handlers.
    pub fn new(
        config: &ScaConfig,
        backends: ServiceBackends,
        provider: Arc<dyn AuthenticationProvider>,
    ) -> Result<Self> {
        Self::with_stages(config, backends, provider, StageRegistry::with_default_stages())
    }

    /// Create a service with a custom stage registry.
    ///
    /// The registry must cover every configured approach that has stages.
    pub fn with_stages(
        config: &ScaConfig,
        backends: ServiceBackends,
        provider: Arc<dyn AuthenticationProvider>,
        stages: StageRegistry,
    ) -> Result<Self> {
        config.validate()?;
        stages.verify_coverage(&config.supported_approaches)?;

        Ok(Self {
            approaches: ApproachRegistry::from_config(config)?,
            resolver: ApproachResolver::new(backends.clone()),
            stages,
            access_checker: Arc::new(StatusEndpointAccessChecker::new(backends.clone())),
            backends,
            provider,
            decider: AuthorisationMethodDecider::from_config(config),
            link_builder: LinkBuilder::from_config(config)?,
        })
    }

    /// Replace the endpoint access checker
    pub fn with_access_checker(mut self, access_checker: Arc<dyn EndpointAccessChecker>) -> Self {
        self.access_checker = access_checker;
        self
    }

    pub fn approach_registry(&self) -> &ApproachRegistry {
        &self.approaches
    }

    pub fn stage_registry(&self) -> &StageRegistry {
        &self.stages
    }

    /// Start a new authorisation in the `received` status.
    pub async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
        scope: &RequestScope,
    ) -> Result<CreateAuthorisationResponse> {
        let approach = self.approaches.initial_approach();
        let resource_id = request.resource.resource_id();
        let service_type = request.resource.service_type();

        let failure = |error: ErrorHolder| CreateAuthorisationResponse {
            resource_id: resource_id.to_string(),
            authorisation_id: None,
            sca_status: None,
            sca_approach: approach,
            links: Links::new(),
            error: Some(error),
        };

        if service_type == ServiceType::Ais && request.flow == AuthorisationFlow::Cancellation {
            warn!(resource_id = %resource_id, "Cancellation authorisation requested for a consent");
            return Ok(failure(classify(Error::ServiceInvalid(
                "Consents have no cancellation authorisations".to_string(),
            ))?));
        }

        let authorisation = Authorisation::new(
            resource_id,
            service_type,
            request.flow,
            request.psu_data.clone(),
            approach,
        )
        .with_payload(request.payload.clone());

        let backend = self.backends.for_service(service_type);
        let authorisation = match backend.create_authorisation(authorisation).await {
            Ok(authorisation) => authorisation,
            Err(e) => {
                error!(resource_id = %resource_id, "Could not create authorisation: {}", e);
                return Ok(failure(classify(Error::from(e))?));
            }
        };

        info!(
            request_id = %scope.request_id(),
            authorisation_id = %authorisation.authorisation_id,
            approach = %approach,
            flow = %request.flow,
            "Authorisation created"
        );

        let params = LinkParams::new(authorisation.sca_status, approach)
            .with_psu_present(authorisation.psu_data.is_not_empty());
        let links = self.link_builder.build(
            &derive_links(&params),
            &request.resource,
            request.flow,
            Some(&authorisation.authorisation_id),
        );

        Ok(CreateAuthorisationResponse {
            resource_id: resource_id.to_string(),
            authorisation_id: Some(authorisation.authorisation_id),
            sca_status: Some(authorisation.sca_status),
            sca_approach: approach,
            links,
            error: None,
        })
    }

    /// Apply a PSU data update to an existing authorisation.
    pub async fn update_psu_data(
        &self,
        request: &UpdatePsuDataRequest,
        scope: &mut RequestScope,
    ) -> Result<UpdatePsuDataResponse> {
        let authorisation_id = request.authorisation_id.as_str();
        let resource_id = request.resource_id();
        let flow = request.flow;
        let backend = self.backends.for_service(scope.service_type());

        let (accessible, loaded) = tokio::join!(
            self.access_checker
                .is_endpoint_accessible(authorisation_id, flow),
            backend.get_authorisation(authorisation_id, flow),
        );

        let (accessible, loaded) = match (accessible, loaded.map_err(Error::from)) {
            (Ok(accessible), Ok(loaded)) => (accessible, loaded),
            (Err(e), _) | (_, Err(e)) => {
                error!(authorisation_id = %authorisation_id, "Could not load authorisation: {}", e);
                return Ok(UpdatePsuDataResponse::error(
                    resource_id,
                    authorisation_id,
                    None,
                    classify(e)?,
                ));
            }
        };

        if !accessible {
            warn!(authorisation_id = %authorisation_id, "Endpoint blocked for authorisation");
            return Ok(UpdatePsuDataResponse::error(
                resource_id,
                authorisation_id,
                loaded.map(|a| a.sca_status),
                classify(Error::AccessBlocked(
                    "The endpoint is blocked for this authorisation".to_string(),
                ))?,
            ));
        }

        let authorisation = match loaded {
            Some(authorisation) if authorisation.resource_id == resource_id => authorisation,
            _ => {
                warn!(
                    authorisation_id = %authorisation_id,
                    resource_id = %resource_id,
                    "Authorisation not found"
                );
                return Ok(UpdatePsuDataResponse::error(
                    resource_id,
                    authorisation_id,
                    None,
                    classify(Error::NotFound("Authorisation is not found".to_string()))?,
                ));
            }
        };
        let current_status = authorisation.sca_status;

        let approach = match self.resolver.resolve(authorisation_id, flow, scope).await {
            Ok(approach) => approach,
            Err(e) => {
                warn!(authorisation_id = %authorisation_id, "Could not resolve SCA approach: {}", e);
                return Ok(UpdatePsuDataResponse::error(
                    resource_id,
                    authorisation_id,
                    Some(current_status),
                    classify(e)?,
                ));
            }
        };

        if !approach.has_embedded_stages() {
            warn!(
                authorisation_id = %authorisation_id,
                approach = %approach,
                "PSU data update for an approach without stages"
            );
            return Ok(UpdatePsuDataResponse::error(
                resource_id,
                authorisation_id,
                Some(current_status),
                classify(Error::ServiceInvalid(format!(
                    "PSU data cannot be updated for the {} approach",
                    approach
                )))?,
            ));
        }

        let key = StageKey::new(scope.service_type(), flow, approach, current_status);
        let handler = self.stages.dispatch(&key)?;

        let psu = first_present(&[&request.psu_data, &authorisation.psu_data])
            .cloned()
            .unwrap_or_default();
        let context = SpiContext::new(
            scope.request_id(),
            psu,
            scope.service_type(),
            flow,
            authorisation_id,
        );
        let services = StageServices {
            provider: self.provider.as_ref(),
            context: &context,
        };

        let mut result = handler
            .apply(&services, approach, request, &authorisation)
            .await;

        if !result.has_error() && !current_status.can_transition_to(result.sca_status) {
            error!(
                authorisation_id = %authorisation_id,
                stage = %key,
                from = %current_status,
                to = %result.sca_status,
                "Stage reported a status regression"
            );
            result = TransitionResult::failed(
                classify(Error::Internal(format!(
                    "Status cannot move from {} to {}",
                    current_status, result.sca_status
                )))?,
                current_status,
                result.psu_data,
            );
        }

        if !result.has_error() {
            match backend.save_transition(authorisation_id, flow, &result).await {
                Ok(()) => {
                    info!(
                        authorisation_id = %authorisation_id,
                        stage = %key,
                        status = %result.sca_status,
                        "Authorisation updated"
                    );
                    if let Some(switched) = result.sca_approach {
                        scope.force_approach(switched);
                    }
                }
                Err(e) => {
                    error!(
                        authorisation_id = %authorisation_id,
                        "Could not save transition: {}", e
                    );
                    result = TransitionResult::failed(
                        classify(Error::from(e))?,
                        current_status,
                        result.psu_data,
                    );
                }
            }
        } else {
            warn!(
                authorisation_id = %authorisation_id,
                stage = %key,
                "PSU data update rejected"
            );
        }

        let links = if result.has_error() {
            Links::new()
        } else {
            let link_approach = match self.resolver.resolve(authorisation_id, flow, scope).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(
                        authorisation_id = %authorisation_id,
                        "Could not re-resolve SCA approach for links: {}", e
                    );
                    result.sca_approach.unwrap_or(approach)
                }
            };
            let params = LinkParams::new(result.sca_status, link_approach)
                .with_psu_present(
                    result.psu_data.is_not_empty() || authorisation.psu_data.is_not_empty(),
                )
                .with_sca_method_chosen(
                    result.chosen_sca_method.is_some() || authorisation.chosen_sca_method.is_some(),
                );
            self.link_builder.build(
                &derive_links(&params),
                &request.resource,
                flow,
                Some(authorisation_id),
            )
        };

        Ok(UpdatePsuDataResponse {
            resource_id: resource_id.to_string(),
            authorisation_id: authorisation_id.to_string(),
            sca_status: Some(result.sca_status),
            chosen_sca_method: result.chosen_sca_method,
            available_sca_methods: result.available_sca_methods,
            challenge_data: result.challenge_data,
            psu_message: result.psu_message,
            links,
            error: result.error,
        })
    }

    /// Current status of an authorisation. Never runs a stage.
    pub async fn get_sca_status(
        &self,
        resource: &ResourceRef,
        authorisation_id: &str,
        flow: AuthorisationFlow,
        scope: &RequestScope,
    ) -> Result<ScaStatusResponse> {
        let backend = self.backends.for_service(scope.service_type());
        let loaded = backend
            .get_authorisation(authorisation_id, flow)
            .await
            .map_err(Error::from);

        match loaded {
            Ok(Some(authorisation)) if authorisation.resource_id == resource.resource_id() => {
                let mut links = Links::new();
                links.set(
                    LinkType::ScaStatus,
                    self.link_builder
                        .authorisation_url(resource, flow, authorisation_id),
                );
                Ok(ScaStatusResponse {
                    sca_status: Some(authorisation.sca_status),
                    links,
                    error: None,
                })
            }
            Ok(_) => Ok(ScaStatusResponse {
                sca_status: None,
                links: Links::new(),
                error: Some(classify(Error::NotFound(
                    "Authorisation is not found".to_string(),
                ))?),
            }),
            Err(e) => Ok(ScaStatusResponse {
                sca_status: None,
                links: Links::new(),
                error: Some(classify(e)?),
            }),
        }
    }

    /// Links for a freshly created payment or consent.
    ///
    /// The approach is the one bound to the implicitly created
    /// authorisation, or the initial approach when there is none yet.
    /// `self` and `status` of the resource are always present.
    pub async fn initiation_links(
        &self,
        request: &InitiationLinkRequest,
        scope: &mut RequestScope,
    ) -> Result<Links> {
        let approach = match &request.authorisation_id {
            Some(id) => self.resolver.initiation_approach(id, scope).await?,
            None => self.approaches.initial_approach(),
        };

        let explicit = self.decider.is_explicit_method(
            scope.tpp_explicit_preferred(),
            request.multilevel_sca_required,
        );
        let params = LinkParams::new(ScaStatus::Received, approach)
            .with_explicit_method(explicit)
            .with_psu_present(request.psu_data.is_not_empty())
            .with_multilevel_sca_required(request.multilevel_sca_required);

        let mut links = derive_links(&params);
        links.insert(LinkType::SelfLink).insert(LinkType::Status);

        Ok(self.link_builder.build(
            &links,
            &request.resource,
            AuthorisationFlow::Initiation,
            request.authorisation_id.as_deref(),
        ))
    }
}

/// Error holder for an expected failure; fatal errors are passed on.
fn classify(err: Error) -> Result<ErrorHolder> {
    if err.is_fatal() {
        return Err(err);
    }
    err.to_error_holder().ok_or(err)
}

