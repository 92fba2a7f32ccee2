//! Data model for the XS2A Strong Customer Authentication core
//!
//! This crate defines the values the SCA authorisation core reasons about:
//! SCA statuses and approaches, PSU identification data, authorisation
//! records, stage transition results, error classification and navigation
//! links.
//!
//! XS2A is the Berlin Group "access to account" interface that banks
//! (ASPSPs) expose to Third Party Providers under PSD2. Every payment,
//! payment cancellation and account consent must be authorised by the
//! customer (PSU) through Strong Customer Authentication.

pub mod domain;
pub mod error;

pub use domain::{
    AuthenticationObject, Authorisation, AuthorisationFlow, ChallengeData,
    CreateAuthorisationRequest, CreateAuthorisationResponse, ErrorHolder, Href, LinkSet, LinkType,
    Links, MessageErrorCode, OtpFormat, PsuIdData, ResourceRef, ScaApproach, ScaStatus,
    ScaStatusResponse, ServiceType, TransitionResult, UpdatePsuDataRequest, UpdatePsuDataResponse,
};
pub use error::{Error, Result};
