use tracing::debug;
use url::Url;
use xs2a_model::{AuthorisationFlow, LinkSet, LinkType, Links, ResourceRef};

use crate::config::ScaConfig;
use crate::error::{Error, Result};

const API_VERSION: &str = "v1";
const OAUTH_PLACEHOLDER: &str = "scaOAuth";

/// Turns a [`LinkSet`] into XS2A URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: Url,
    redirect: RedirectLinkBuilder,
}

impl LinkBuilder {
    pub fn new(base_url: &str, redirect: RedirectLinkBuilder) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Configuration(format!("Invalid XS2A base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "XS2A base URL {} cannot carry a path",
                base_url
            )));
        }
        Ok(Self { base_url, redirect })
    }

    pub fn from_config(config: &ScaConfig) -> Result<Self> {
        Self::new(&config.xs2a_base_url, RedirectLinkBuilder::from_config(config))
    }

    /// URL of the authorisation collection of a resource, e.g.
    /// `http://host/v1/consents/{consentId}/authorisations`.
    pub fn authorisation_collection_url(&self, resource: &ResourceRef, flow: AuthorisationFlow) -> String {
        self.url_for(resource, flow, None)
    }

    /// URL of one authorisation.
    pub fn authorisation_url(
        &self,
        resource: &ResourceRef,
        flow: AuthorisationFlow,
        authorisation_id: &str,
    ) -> String {
        self.url_for(resource, flow, Some(authorisation_id))
    }

    /// URL of the payment or consent, e.g. `http://host/v1/consents/{consentId}`.
    pub fn resource_url(&self, resource: &ResourceRef) -> String {
        self.resource_path(resource, &[])
    }

    /// Transaction or consent status URL of the resource.
    pub fn resource_status_url(&self, resource: &ResourceRef) -> String {
        self.resource_path(resource, &["status"])
    }

    /// Resolve every link of `links`.
    ///
    /// Links that address a single authorisation are left out while no
    /// authorisation exists.
    pub fn build(
        &self,
        links: &LinkSet,
        resource: &ResourceRef,
        flow: AuthorisationFlow,
        authorisation_id: Option<&str>,
    ) -> Links {
        let mut result = Links::new();
        for link in links.iter() {
            if link == LinkType::ScaOAuth {
                result.set(link, OAUTH_PLACEHOLDER);
                continue;
            }
            if link.targets_resource() {
                let href = match link {
                    LinkType::Status => self.resource_status_url(resource),
                    _ => self.resource_url(resource),
                };
                result.set(link, href);
                continue;
            }
            if link.targets_collection() {
                result.set(link, self.authorisation_collection_url(resource, flow));
                continue;
            }

            let authorisation_id = match authorisation_id {
                Some(id) => id,
                None => {
                    debug!(link = %link, "Skipping link without authorisation");
                    continue;
                }
            };
            let href = if link == LinkType::ScaRedirect {
                self.redirect
                    .sca_redirect_link(resource, flow, authorisation_id)
            } else {
                self.authorisation_url(resource, flow, authorisation_id)
            };
            result.set(link, href);
        }
        result
    }

    fn url_for(
        &self,
        resource: &ResourceRef,
        flow: AuthorisationFlow,
        authorisation_id: Option<&str>,
    ) -> String {
        let collection = match flow {
            AuthorisationFlow::Initiation => "authorisations",
            AuthorisationFlow::Cancellation => "cancellation-authorisations",
        };
        match authorisation_id {
            Some(id) => self.resource_path(resource, &[collection, id]),
            None => self.resource_path(resource, &[collection]),
        }
    }

    fn resource_path(&self, resource: &ResourceRef, tail: &[&str]) -> String {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base URL can carry a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(API_VERSION);
            match resource {
                ResourceRef::Consent { consent_id } => {
                    segments.extend(["consents", consent_id.as_str()]);
                }
                ResourceRef::Payment {
                    payment_service,
                    payment_product,
                    payment_id,
                } => {
                    segments.extend([
                        payment_service.as_str(),
                        payment_product.as_str(),
                        payment_id.as_str(),
                    ]);
                }
            }
            segments.extend(tail);
        }
        url.to_string()
    }
}

/// Expands the ASPSP's redirect URL templates.
///
/// Templates may contain `{redirect-id}` and `{encrypted-payment-id}` (PIS)
/// or `{encrypted-consent-id}` (AIS). The authorisation id serves as the
/// redirect id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectLinkBuilder {
    pis_template: String,
    pis_cancellation_template: String,
    ais_template: String,
}

impl RedirectLinkBuilder {
    pub fn new(pis_template: &str, pis_cancellation_template: &str, ais_template: &str) -> Self {
        Self {
            pis_template: pis_template.to_string(),
            pis_cancellation_template: pis_cancellation_template.to_string(),
            ais_template: ais_template.to_string(),
        }
    }

    pub fn from_config(config: &ScaConfig) -> Self {
        Self::new(
            &config.pis_redirect_url,
            &config.pis_cancellation_redirect_url,
            &config.ais_redirect_url,
        )
    }

    pub fn payment_sca_redirect_link(&self, payment_id: &str, redirect_id: &str) -> String {
        self.pis_template
            .replace("{redirect-id}", redirect_id)
            .replace("{encrypted-payment-id}", payment_id)
    }

    pub fn payment_cancellation_sca_redirect_link(
        &self,
        payment_id: &str,
        redirect_id: &str,
    ) -> String {
        self.pis_cancellation_template
            .replace("{redirect-id}", redirect_id)
            .replace("{encrypted-payment-id}", payment_id)
    }

    pub fn consent_sca_redirect_link(&self, consent_id: &str, redirect_id: &str) -> String {
        self.ais_template
            .replace("{redirect-id}", redirect_id)
            .replace("{encrypted-consent-id}", consent_id)
    }

    /// Redirect link for any resource and flow.
    pub fn sca_redirect_link(
        &self,
        resource: &ResourceRef,
        flow: AuthorisationFlow,
        redirect_id: &str,
    ) -> String {
        match (resource, flow) {
            (ResourceRef::Consent { consent_id }, _) => {
                self.consent_sca_redirect_link(consent_id, redirect_id)
            }
            (ResourceRef::Payment { payment_id, .. }, AuthorisationFlow::Initiation) => {
                self.payment_sca_redirect_link(payment_id, redirect_id)
            }
            (ResourceRef::Payment { payment_id, .. }, AuthorisationFlow::Cancellation) => {
                self.payment_cancellation_sca_redirect_link(payment_id, redirect_id)
            }
        }
    }
}
