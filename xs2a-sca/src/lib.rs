//! # XS2A SCA Core
//!
//! This crate implements the Strong Customer Authentication (SCA) decision
//! core of a PSD2/XS2A interface. It sits between the Third Party Provider
//! (TPP), the consent management backend (CMS) that stores payments,
//! consents and their authorisations, and the bank's own authentication
//! backend (SPI).
//!
//! ## Overview
//!
//! Every payment, payment cancellation and account consent has to be
//! authorised by the customer (PSU). For an authorisation in progress the
//! core:
//!
//! - Resolves the SCA approach (embedded, decoupled, redirect, OAuth) that
//!   governs it
//! - Selects the stage handler for its current status and approach
//! - Runs the handler against the authentication backend and computes the
//!   next status
//! - Derives the navigation links the TPP has to follow next
//!
//! ## Architecture
//!
//! - **Approach Registry**: ASPSP-configured approaches; picks the approach
//!   of a new authorisation
//! - **Approach Resolver**: approach of an existing authorisation, with a
//!   one-shot per-request override
//! - **Stage Registry**: maps service, flow, approach and status to a stage
//!   handler
//! - **Stage Handlers**: one per status, executing the transition
//! - **Link Deriver**: pure function from state to the next links
//! - **Authorisation Service**: drives one request through all of the above
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xs2a_model::{AuthorisationFlow, PsuIdData, ResourceRef, UpdatePsuDataRequest};
//! use xs2a_sca::{
//!     AuthenticationProvider, AuthorisationService, InMemoryCms, PathServiceTypeDiscovery,
//!     RequestScope, ScaConfig, ServiceBackends,
//! };
//!
//! async fn example(provider: Arc<dyn AuthenticationProvider>) -> xs2a_sca::Result<()> {
//!     let config = ScaConfig::from_json(
//!         r#"{"supportedApproaches": ["EMBEDDED"], "xs2aBaseUrl": "https://bank.example"}"#,
//!     )?;
//!     let cms = Arc::new(InMemoryCms::new());
//!     let service = AuthorisationService::new(&config, ServiceBackends::shared(cms), provider)?;
//!
//!     let mut scope = RequestScope::for_path(
//!         "/v1/consents/consent-1/authorisations/auth-1",
//!         &PathServiceTypeDiscovery,
//!     )?;
//!     let request = UpdatePsuDataRequest::new(
//!         ResourceRef::consent("consent-1"),
//!         "auth-1",
//!         AuthorisationFlow::Initiation,
//!     )
//!     .authentication(PsuIdData::new("PSU-1"), "12345");
//!
//!     let response = service.update_psu_data(&request, &mut scope).await?;
//!     if let Some(error) = response.error {
//!         println!("rejected: {}", error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety and Async
//!
//! All collaborator traits are `Send + Sync` and async, so a single
//! [`AuthorisationService`] can be shared across a multi-threaded `tokio`
//! runtime. Nothing request-specific is stored in the service.

pub mod access;
pub mod approach;
pub mod cms;
pub mod config;
pub mod discovery;
pub mod error;
pub mod links;
pub mod memory;
pub mod scope;
pub mod service;
pub mod spi;
pub mod stage;

pub use access::{AllowAllAccessChecker, EndpointAccessChecker, StatusEndpointAccessChecker};
pub use approach::{ApproachRegistry, ApproachResolver};
pub use cms::{AuthorisationBackend, CmsError, ServiceBackends};
pub use config::ScaConfig;
pub use discovery::{PathServiceTypeDiscovery, ServiceTypeDiscovery};
pub use error::{Error, Result};
pub use links::{
    derive_links, AuthorisationMethodDecider, LinkBuilder, LinkParams, RedirectLinkBuilder,
};
pub use memory::InMemoryCms;
pub use scope::RequestScope;
pub use service::{AuthorisationService, InitiationLinkRequest};
pub use spi::{AuthenticationProvider, DecoupledScaOutcome, SpiContext, SpiError, SpiResult};
pub use stage::{StageHandler, StageKey, StageRegistry, StageServices};
