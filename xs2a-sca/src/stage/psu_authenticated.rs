use tracing::{info, warn};
use xs2a_model::{
    AuthenticationObject, Authorisation, PsuIdData, ScaApproach, ScaStatus, TransitionResult,
    UpdatePsuDataRequest,
};

use super::{decoupled, format_error, psu_of, rejected, StageServices};

/// SCA method selection.
///
/// With a method id in the request that method is selected. Without one the
/// provider's methods are listed: none means the PSU is exempted from SCA, a
/// single one is selected automatically, several are returned for the PSU to
/// choose from.
pub(super) async fn apply(
    services: &StageServices<'_>,
    approach: ScaApproach,
    request: &UpdatePsuDataRequest,
    authorisation: &Authorisation,
) -> TransitionResult {
    let psu = psu_of(request, authorisation);

    if let Some(method_id) = request.authentication_method_id.as_deref() {
        let methods = if authorisation.available_sca_methods.is_empty() {
            match request_methods(services, authorisation, &psu).await {
                Ok(methods) => methods,
                Err(result) => return result,
            }
        } else {
            authorisation.available_sca_methods.clone()
        };

        let method = match methods
            .iter()
            .find(|m| m.authentication_method_id == method_id)
        {
            Some(method) => method.clone(),
            None => {
                warn!(
                    authorisation_id = %authorisation.authorisation_id,
                    method_id = %method_id,
                    "Unknown SCA method selected"
                );
                return format_error(
                    &format!("Unknown SCA method: {}", method_id),
                    authorisation,
                    psu,
                );
            }
        };
        return select_method(services, approach, method, methods, authorisation, psu).await;
    }

    let methods = match request_methods(services, authorisation, &psu).await {
        Ok(methods) => methods,
        Err(result) => return result,
    };

    match methods.len() {
        0 => {
            info!(
                authorisation_id = %authorisation.authorisation_id,
                "No SCA methods available, SCA exempted"
            );
            TransitionResult::status(ScaStatus::Finalised, psu)
        }
        1 => {
            let method = methods[0].clone();
            select_method(services, approach, method, methods, authorisation, psu).await
        }
        _ => TransitionResult::status(ScaStatus::PsuAuthenticated, psu).with_available_methods(methods),
    }
}

async fn request_methods(
    services: &StageServices<'_>,
    authorisation: &Authorisation,
    psu: &PsuIdData,
) -> Result<Vec<AuthenticationObject>, TransitionResult> {
    services
        .provider
        .request_available_sca_methods(services.context, &authorisation.payload)
        .await
        .map_err(|e| {
            warn!(
                authorisation_id = %authorisation.authorisation_id,
                "Could not list SCA methods: {}", e
            );
            rejected(e.into(), authorisation, psu.clone())
        })
}

/// Select `method`. A decoupled-only method on an embedded authorisation
/// switches it to decoupled.
async fn select_method(
    services: &StageServices<'_>,
    approach: ScaApproach,
    method: AuthenticationObject,
    methods: Vec<AuthenticationObject>,
    authorisation: &Authorisation,
    psu: PsuIdData,
) -> TransitionResult {
    if approach == ScaApproach::Decoupled || method.decoupled {
        let result =
            decoupled::proceed_decoupled_initiation(services, authorisation, Some(&method), psu)
                .await
                .with_available_methods(methods);
        if approach == ScaApproach::Embedded && !result.has_error() {
            info!(
                authorisation_id = %authorisation.authorisation_id,
                method_id = %method.authentication_method_id,
                "Switching SCA approach from EMBEDDED to DECOUPLED"
            );
            return result.with_approach_switch(ScaApproach::Decoupled);
        }
        return result;
    }

    match services
        .provider
        .request_authorisation_code(
            services.context,
            &method.authentication_method_id,
            &authorisation.payload,
        )
        .await
    {
        Ok(challenge_data) => TransitionResult::status(ScaStatus::ScaMethodSelected, psu)
            .with_chosen_method(method)
            .with_available_methods(methods)
            .with_challenge_data(challenge_data),
        Err(e) => {
            warn!(
                authorisation_id = %authorisation.authorisation_id,
                method_id = %method.authentication_method_id,
                "Authorisation code request failed: {}", e
            );
            rejected(e.into(), authorisation, psu)
        }
    }
}
