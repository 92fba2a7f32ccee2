use tracing::{info, warn};
use xs2a_model::{Authorisation, ScaApproach, ScaStatus, TransitionResult, UpdatePsuDataRequest};

use super::{format_error, psu_of, rejected, StageServices};

pub(super) const SCA_DATA_MISSING: &str = "Please provide the SCA authentication data";
pub(super) const DECOUPLED_PENDING: &str =
    "Please confirm the authorisation in your banking application";

/// Finalisation.
///
/// Embedded authorisations submit the PSU's authentication code. Decoupled
/// ones are confirmed out of band, so the status stays as it is.
pub(super) async fn apply(
    services: &StageServices<'_>,
    approach: ScaApproach,
    request: &UpdatePsuDataRequest,
    authorisation: &Authorisation,
) -> TransitionResult {
    let psu = psu_of(request, authorisation);

    if approach == ScaApproach::Decoupled {
        return TransitionResult::status(authorisation.sca_status, psu)
            .with_psu_message(Some(DECOUPLED_PENDING.to_string()));
    }

    let code = match request
        .sca_authentication_data
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        Some(code) => code,
        None => return format_error(SCA_DATA_MISSING, authorisation, psu),
    };

    match services
        .provider
        .verify_sca_authorisation(services.context, code, &authorisation.payload)
        .await
    {
        Ok(()) => {
            info!(
                authorisation_id = %authorisation.authorisation_id,
                "SCA finalised"
            );
            let result = TransitionResult::status(ScaStatus::Finalised, psu);
            match &authorisation.chosen_sca_method {
                Some(method) => result.with_chosen_method(method.clone()),
                None => result,
            }
        }
        Err(e) => {
            warn!(
                authorisation_id = %authorisation.authorisation_id,
                "Authentication code rejected: {}", e
            );
            rejected(e.into(), authorisation, psu)
        }
    }
}
