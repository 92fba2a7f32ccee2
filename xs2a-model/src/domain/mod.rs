//! XS2A domain types used by the SCA authorisation core.

pub mod authorisation;
pub mod links;
pub mod psu;
pub mod psu_data;
pub mod sca;
pub mod tpp_message;
pub mod transition;

pub use authorisation::{
    AuthenticationObject, Authorisation, AuthorisationFlow, ChallengeData, OtpFormat, ResourceRef,
    ServiceType,
};
pub use links::{Href, LinkSet, LinkType, Links};
pub use psu::PsuIdData;
pub use psu_data::{
    CreateAuthorisationRequest, CreateAuthorisationResponse, ScaStatusResponse,
    UpdatePsuDataRequest, UpdatePsuDataResponse,
};
pub use sca::{ScaApproach, ScaStatus};
pub use tpp_message::{ErrorHolder, MessageErrorCode};
pub use transition::TransitionResult;
