use tracing::{info, warn};
use xs2a_model::{AuthenticationObject, Authorisation, PsuIdData, TransitionResult};

use super::{rejected, StageServices};

/// Start the out-of-band confirmation and adopt the status the provider
/// reports.
pub(super) async fn proceed_decoupled_initiation(
    services: &StageServices<'_>,
    authorisation: &Authorisation,
    method: Option<&AuthenticationObject>,
    psu: PsuIdData,
) -> TransitionResult {
    let method_id = method.map(|m| m.authentication_method_id.as_str());
    match services
        .provider
        .start_decoupled_sca(services.context, method_id, &authorisation.payload)
        .await
    {
        Ok(outcome) => {
            info!(
                authorisation_id = %authorisation.authorisation_id,
                status = %outcome.sca_status,
                "Decoupled SCA started"
            );
            let result =
                TransitionResult::status(outcome.sca_status, psu).with_psu_message(outcome.psu_message);
            match method {
                Some(method) => result.with_chosen_method(method.clone()),
                None => result,
            }
        }
        Err(e) => {
            warn!(
                authorisation_id = %authorisation.authorisation_id,
                "Decoupled SCA could not be started: {}", e
            );
            rejected(e.into(), authorisation, psu)
        }
    }
}
