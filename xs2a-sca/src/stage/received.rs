use tracing::{debug, warn};
use xs2a_model::{Authorisation, ScaApproach, ScaStatus, TransitionResult, UpdatePsuDataRequest};

use super::{decoupled, format_error, psu_of, rejected, StageServices};

pub(super) const PSU_IDENTIFICATION_MISSING: &str = "Please provide the PSU identification data";
pub(super) const PSU_PASSWORD_MISSING: &str = "Please provide the PSU password";

/// Received stage: identification only, or full PSU authorisation.
pub(super) async fn apply_received(
    services: &StageServices<'_>,
    approach: ScaApproach,
    request: &UpdatePsuDataRequest,
    authorisation: &Authorisation,
) -> TransitionResult {
    if request.update_psu_identification {
        return identify_psu(request, authorisation);
    }
    authorise_psu(services, approach, request, authorisation).await
}

fn identify_psu(request: &UpdatePsuDataRequest, authorisation: &Authorisation) -> TransitionResult {
    if request.psu_data.is_empty() {
        warn!(
            authorisation_id = %authorisation.authorisation_id,
            "PSU identification update without PSU data"
        );
        return format_error(
            PSU_IDENTIFICATION_MISSING,
            authorisation,
            authorisation.psu_data.clone(),
        );
    }

    debug!(authorisation_id = %authorisation.authorisation_id, "PSU identified");
    TransitionResult::status(ScaStatus::PsuIdentified, request.psu_data.clone())
}

/// Check the PSU's password with the authentication provider.
///
/// Embedded authorisations move on to `psuAuthenticated`. Decoupled ones
/// start the out-of-band confirmation right away.
pub(super) async fn authorise_psu(
    services: &StageServices<'_>,
    approach: ScaApproach,
    request: &UpdatePsuDataRequest,
    authorisation: &Authorisation,
) -> TransitionResult {
    let psu = psu_of(request, authorisation);
    if psu.is_empty() {
        return format_error(PSU_IDENTIFICATION_MISSING, authorisation, psu);
    }

    let password = match request.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => return format_error(PSU_PASSWORD_MISSING, authorisation, psu),
    };

    if let Err(e) = services
        .provider
        .authorise_psu(services.context, &psu, password, &authorisation.payload)
        .await
    {
        warn!(
            authorisation_id = %authorisation.authorisation_id,
            "PSU authorisation failed: {}", e
        );
        return rejected(e.into(), authorisation, psu);
    }

    match approach {
        ScaApproach::Decoupled => {
            decoupled::proceed_decoupled_initiation(services, authorisation, None, psu).await
        }
        _ => TransitionResult::status(ScaStatus::PsuAuthenticated, psu),
    }
}
