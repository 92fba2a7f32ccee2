mod common;

use common::*;
use proptest::prelude::*;
use xs2a_model::{
    AuthenticationObject, AuthorisationFlow, PsuIdData, ScaApproach, ScaStatus, ServiceType,
    UpdatePsuDataRequest,
};
use xs2a_sca::{Error, RequestScope, StageKey, StageRegistry};

/// One PSU data update as a TPP could send it
#[derive(Debug, Clone)]
enum Step {
    Identify(bool),
    Authenticate(bool),
    Select(&'static str),
    Code(&'static str),
    Empty,
}

impl Step {
    fn request(&self, authorisation_id: &str) -> UpdatePsuDataRequest {
        let base = UpdatePsuDataRequest::new(payment(), authorisation_id, AuthorisationFlow::Initiation);
        match self {
            Step::Identify(true) => base.identification(psu()),
            Step::Identify(false) => base.identification(PsuIdData::empty()),
            Step::Authenticate(true) => base.authentication(psu(), PASSWORD),
            Step::Authenticate(false) => base.authentication(psu(), "wrong"),
            Step::Select(method_id) => base.select_method(method_id),
            Step::Code(code) => base.authentication_code(code),
            Step::Empty => base,
        }
    }
}

// Strategy for generating PSU data updates
fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<bool>().prop_map(Step::Identify),
        any::<bool>().prop_map(Step::Authenticate),
        prop::sample::select(vec!["sms", "chip", "app", "unknown"]).prop_map(Step::Select),
        prop::sample::select(vec![OTP, "000000", ""]).prop_map(Step::Code),
        Just(Step::Empty),
    ]
}

// Strategy for generating the SCA methods the provider offers
fn methods_strategy() -> impl Strategy<Value = Vec<AuthenticationObject>> {
    prop::sample::subsequence(vec![sms_method(), chip_method(), app_method()], 0..=3)
}

fn staged_approach_strategy() -> impl Strategy<Value = ScaApproach> {
    prop_oneof![Just(ScaApproach::Embedded), Just(ScaApproach::Decoupled)]
}

fn stage_key_strategy() -> impl Strategy<Value = StageKey> {
    (
        prop_oneof![Just(ServiceType::Ais), Just(ServiceType::Pis)],
        prop_oneof![
            Just(AuthorisationFlow::Initiation),
            Just(AuthorisationFlow::Cancellation)
        ],
        prop::sample::select(ScaApproach::ALL.to_vec()),
        prop::sample::select(ScaStatus::ALL.to_vec()),
    )
        .prop_map(|(service, flow, approach, status)| StageKey::new(service, flow, approach, status))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // The stored status never moves backwards and failed updates leave no trace
    #[test]
    fn test_status_is_monotonic(
        approach in staged_approach_strategy(),
        methods in methods_strategy(),
        decoupled_status in prop::sample::select(ScaStatus::ALL.to_vec()),
        steps in prop::collection::vec(step_strategy(), 1..12),
    ) {
        tokio_test::block_on(async {
            let provider = MockProvider::new()
                .with_methods(methods)
                .with_decoupled_status(decoupled_status);
            let ctx = setup_with(default_config(), provider);
            let auth = seed(
                &ctx,
                &payment(),
                AuthorisationFlow::Initiation,
                approach,
                ScaStatus::Received,
                PsuIdData::empty(),
            );
            let id = auth.authorisation_id.as_str();

            for step in steps {
                let before = ctx.cms.inner.get(id).unwrap();
                let saves_before = ctx.cms.saves();

                let mut scope = RequestScope::new(ServiceType::Pis);
                let response = ctx
                    .service
                    .update_psu_data(&step.request(id), &mut scope)
                    .await
                    .unwrap();
                let after = ctx.cms.inner.get(id).unwrap();

                prop_assert!(before.sca_status.can_transition_to(after.sca_status));
                if response.has_error() {
                    prop_assert_eq!(ctx.cms.saves(), saves_before);
                    prop_assert_eq!(after.sca_status, before.sca_status);
                    prop_assert!(response.links.is_empty());
                } else {
                    prop_assert_eq!(response.sca_status, Some(after.sca_status));
                    prop_assert!(!response.links.is_empty());
                }

                // A decoupled authorisation never falls back to embedded
                if before.sca_approach == Some(ScaApproach::Decoupled) {
                    prop_assert_eq!(after.sca_approach, Some(ScaApproach::Decoupled));
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    // Every key either has a handler or fails with its own name
    #[test]
    fn test_dispatch_is_total(key in stage_key_strategy()) {
        let registry = StageRegistry::with_default_stages();
        match registry.dispatch(&key) {
            Ok(_) => {
                prop_assert!(key.approach.has_embedded_stages());
                prop_assert!(!key.status.is_terminal());
                prop_assert!(
                    !(key.service == ServiceType::Ais && key.flow == AuthorisationFlow::Cancellation)
                );
            }
            Err(Error::UnsupportedStageConfiguration(name)) => {
                prop_assert_eq!(name, key.to_string());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
