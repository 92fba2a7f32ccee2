//! Per-request state
//!
//! A [`RequestScope`] lives for exactly one TPP request. Besides the request
//! id and the discovered service type it carries the one-shot approach
//! override that method selection sets when it falls back from embedded to
//! decoupled SCA.

use crate::discovery::ServiceTypeDiscovery;
use crate::error::Result;
use uuid::Uuid;
use xs2a_model::{ScaApproach, ServiceType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestScope {
    request_id: Uuid,
    service_type: ServiceType,
    tpp_explicit_preferred: bool,
    forced_approach: Option<ScaApproach>,
}

impl RequestScope {
    pub fn new(service_type: ServiceType) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            service_type,
            tpp_explicit_preferred: false,
            forced_approach: None,
        }
    }

    /// Build a scope for a request path.
    pub fn for_path(path: &str, discovery: &dyn ServiceTypeDiscovery) -> Result<Self> {
        Ok(Self::new(discovery.service_type(path)?))
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Record the TPP-Explicit-Authorisation-Preferred header.
    pub fn with_tpp_explicit_preferred(mut self, preferred: bool) -> Self {
        self.tpp_explicit_preferred = preferred;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn tpp_explicit_preferred(&self) -> bool {
        self.tpp_explicit_preferred
    }

    /// Force the next approach resolution in this request to `approach`.
    pub fn force_approach(&mut self, approach: ScaApproach) {
        self.forced_approach = Some(approach);
    }

    /// Consume the override, if one is set.
    pub fn take_forced_approach(&mut self) -> Option<ScaApproach> {
        self.forced_approach.take()
    }

    pub fn has_forced_approach(&self) -> bool {
        self.forced_approach.is_some()
    }
}
