//! Service type discovery
//!
//! Decides from the request path whether a request belongs to account
//! information (AIS) or payment initiation (PIS). The answer selects the
//! backend that owns the authorisation and the service part of the stage key.

use crate::error::{Error, Result};
use xs2a_model::ServiceType;

/// Maps a request path to the service it belongs to
pub trait ServiceTypeDiscovery: Send + Sync {
    fn service_type(&self, path: &str) -> Result<ServiceType>;
}

const AIS_RESOURCES: [&str; 3] = ["consents", "accounts", "card-accounts"];
const PIS_RESOURCES: [&str; 3] = ["payments", "bulk-payments", "periodic-payments"];

/// Discovers the service from the first resource segment of an XS2A path
/// such as `/v1/payments/sepa-credit-transfers/{id}/authorisations`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathServiceTypeDiscovery;

impl PathServiceTypeDiscovery {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceTypeDiscovery for PathServiceTypeDiscovery {
    fn service_type(&self, path: &str) -> Result<ServiceType> {
        let resource = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .find(|segment| !is_version_segment(segment));

        match resource {
            Some(r) if AIS_RESOURCES.contains(&r) => Ok(ServiceType::Ais),
            Some(r) if PIS_RESOURCES.contains(&r) => Ok(ServiceType::Pis),
            _ => Err(Error::Validation(format!(
                "Cannot determine service type for path {}",
                path
            ))),
        }
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}
