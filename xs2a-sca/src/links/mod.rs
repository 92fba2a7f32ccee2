//! Link derivation
//!
//! After every operation the TPP is told where to go next. [`derive_links`]
//! decides *which* links apply from the authorisation's state;
//! [`LinkBuilder`] and [`RedirectLinkBuilder`] decide *where* they point.

pub mod builder;
pub mod decider;

pub use builder::{LinkBuilder, RedirectLinkBuilder};
pub use decider::AuthorisationMethodDecider;

use xs2a_model::{LinkSet, LinkType, ScaApproach, ScaStatus};

/// Everything link derivation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkParams {
    pub sca_status: ScaStatus,
    pub sca_approach: ScaApproach,
    /// Explicit authorisation start, see [`AuthorisationMethodDecider`]
    pub explicit_method: bool,
    pub psu_present: bool,
    pub multilevel_sca_required: bool,
    pub sca_method_chosen: bool,
}

impl LinkParams {
    pub fn new(sca_status: ScaStatus, sca_approach: ScaApproach) -> Self {
        Self {
            sca_status,
            sca_approach,
            explicit_method: false,
            psu_present: false,
            multilevel_sca_required: false,
            sca_method_chosen: false,
        }
    }

    pub fn with_explicit_method(mut self, explicit: bool) -> Self {
        self.explicit_method = explicit;
        self
    }

    pub fn with_psu_present(mut self, present: bool) -> Self {
        self.psu_present = present;
        self
    }

    pub fn with_multilevel_sca_required(mut self, required: bool) -> Self {
        self.multilevel_sca_required = required;
        self
    }

    pub fn with_sca_method_chosen(mut self, chosen: bool) -> Self {
        self.sca_method_chosen = chosen;
        self
    }
}

/// The next links for the TPP.
pub fn derive_links(params: &LinkParams) -> LinkSet {
    match params.sca_approach {
        ScaApproach::OAuth => LinkSet::of(&[LinkType::ScaOAuth]),
        ScaApproach::Redirect => {
            if params.explicit_method {
                LinkSet::of(&[LinkType::StartAuthorisation])
            } else {
                LinkSet::of(&[LinkType::ScaRedirect, LinkType::ScaStatus])
            }
        }
        ScaApproach::Embedded | ScaApproach::Decoupled => embedded_links(params),
    }
}

fn embedded_links(params: &LinkParams) -> LinkSet {
    match params.sca_status {
        ScaStatus::Received if params.explicit_method => {
            // Without multilevel SCA nothing else is needed to start.
            if !params.multilevel_sca_required {
                LinkSet::of(&[LinkType::StartAuthorisation])
            } else if params.psu_present {
                LinkSet::of(&[LinkType::StartAuthorisationWithPsuAuthentication])
            } else {
                LinkSet::of(&[LinkType::StartAuthorisationWithPsuIdentification])
            }
        }
        ScaStatus::Received => {
            let update = if params.psu_present {
                LinkType::UpdatePsuAuthentication
            } else {
                LinkType::UpdatePsuIdentification
            };
            LinkSet::of(&[update, LinkType::ScaStatus])
        }
        ScaStatus::PsuIdentified => LinkSet::of(&[LinkType::UpdatePsuAuthentication]),
        ScaStatus::PsuAuthenticated => LinkSet::of(&[LinkType::SelectAuthenticationMethod]),
        ScaStatus::ScaMethodSelected => {
            if params.sca_approach == ScaApproach::Embedded && params.sca_method_chosen {
                LinkSet::of(&[LinkType::AuthoriseTransaction])
            } else {
                LinkSet::of(&[LinkType::ScaStatus])
            }
        }
        ScaStatus::Finalised | ScaStatus::Failed => LinkSet::of(&[LinkType::ScaStatus]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn links(params: LinkParams) -> Vec<LinkType> {
        derive_links(&params).iter().collect()
    }

    #[test]
    fn test_explicit_start_links() {
        let base = LinkParams::new(ScaStatus::Received, ScaApproach::Embedded)
            .with_explicit_method(true);

        assert_eq!(links(base), vec![LinkType::StartAuthorisation]);
        assert_eq!(
            links(base.with_multilevel_sca_required(true)),
            vec![LinkType::StartAuthorisationWithPsuIdentification]
        );
        assert_eq!(
            links(base.with_multilevel_sca_required(true).with_psu_present(true)),
            vec![LinkType::StartAuthorisationWithPsuAuthentication]
        );
    }

    #[test]
    fn test_implicit_received_links() {
        let base = LinkParams::new(ScaStatus::Received, ScaApproach::Decoupled);
        assert_eq!(
            links(base),
            vec![LinkType::UpdatePsuIdentification, LinkType::ScaStatus]
        );
        assert_eq!(
            links(base.with_psu_present(true)),
            vec![LinkType::UpdatePsuAuthentication, LinkType::ScaStatus]
        );
    }

    #[test]
    fn test_status_links() {
        assert_eq!(
            links(LinkParams::new(ScaStatus::PsuIdentified, ScaApproach::Embedded)),
            vec![LinkType::UpdatePsuAuthentication]
        );
        assert_eq!(
            links(LinkParams::new(ScaStatus::PsuAuthenticated, ScaApproach::Embedded)),
            vec![LinkType::SelectAuthenticationMethod]
        );
        assert_eq!(
            links(
                LinkParams::new(ScaStatus::ScaMethodSelected, ScaApproach::Embedded)
                    .with_sca_method_chosen(true)
            ),
            vec![LinkType::AuthoriseTransaction]
        );
        assert_eq!(
            links(
                LinkParams::new(ScaStatus::ScaMethodSelected, ScaApproach::Decoupled)
                    .with_sca_method_chosen(true)
            ),
            vec![LinkType::ScaStatus]
        );
        assert_eq!(
            links(LinkParams::new(ScaStatus::Finalised, ScaApproach::Embedded)),
            vec![LinkType::ScaStatus]
        );
        assert_eq!(
            links(LinkParams::new(ScaStatus::Failed, ScaApproach::Decoupled)),
            vec![LinkType::ScaStatus]
        );
    }

    #[test]
    fn test_redirect_and_oauth_links() {
        let redirect = LinkParams::new(ScaStatus::Received, ScaApproach::Redirect);
        assert_eq!(
            links(redirect),
            vec![LinkType::ScaRedirect, LinkType::ScaStatus]
        );
        assert_eq!(
            links(redirect.with_explicit_method(true)),
            vec![LinkType::StartAuthorisation]
        );
        assert_eq!(
            links(LinkParams::new(ScaStatus::Received, ScaApproach::OAuth).with_explicit_method(true)),
            vec![LinkType::ScaOAuth]
        );
    }

    fn any_status() -> impl Strategy<Value = ScaStatus> {
        prop::sample::select(ScaStatus::ALL.to_vec())
    }

    fn any_approach() -> impl Strategy<Value = ScaApproach> {
        prop::sample::select(ScaApproach::ALL.to_vec())
    }

    fn any_params() -> impl Strategy<Value = LinkParams> {
        (
            any_status(),
            any_approach(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(status, approach, explicit, psu, multilevel, chosen)| {
                LinkParams::new(status, approach)
                    .with_explicit_method(explicit)
                    .with_psu_present(psu)
                    .with_multilevel_sca_required(multilevel)
                    .with_sca_method_chosen(chosen)
            })
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(params in any_params()) {
            prop_assert_eq!(derive_links(&params), derive_links(&params));
        }

        #[test]
        fn prop_never_empty(params in any_params()) {
            prop_assert!(!derive_links(&params).is_empty());
        }

        #[test]
        fn prop_terminal_status_only_polls(
            params in any_params().prop_filter("terminal embedded", |p| {
                p.sca_status.is_terminal() && p.sca_approach.has_embedded_stages()
            })
        ) {
            prop_assert_eq!(derive_links(&params), LinkSet::of(&[LinkType::ScaStatus]));
        }

        #[test]
        fn prop_authorise_transaction_excludes_method_selection(params in any_params()) {
            let set = derive_links(&params);
            if set.contains(LinkType::AuthoriseTransaction) {
                prop_assert!(!set.contains(LinkType::SelectAuthenticationMethod));
                prop_assert_eq!(params.sca_approach, ScaApproach::Embedded);
            }
        }
    }
}
