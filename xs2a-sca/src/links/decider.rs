use crate::config::ScaConfig;

/// Decides whether the TPP has to start the authorisation explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthorisationMethodDecider {
    signing_basket_supported: bool,
}

impl AuthorisationMethodDecider {
    pub fn new(signing_basket_supported: bool) -> Self {
        Self {
            signing_basket_supported,
        }
    }

    pub fn from_config(config: &ScaConfig) -> Self {
        Self::new(config.signing_basket_supported)
    }

    /// Explicit if the TPP asked for it, or if multilevel SCA is required
    /// and the ASPSP supports signing baskets.
    pub fn is_explicit_method(
        &self,
        tpp_explicit_preferred: bool,
        multilevel_sca_required: bool,
    ) -> bool {
        tpp_explicit_preferred || (multilevel_sca_required && self.signing_basket_supported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tpp_preference_wins() {
        let decider = AuthorisationMethodDecider::new(false);
        assert!(decider.is_explicit_method(true, false));
        assert!(!decider.is_explicit_method(false, false));
        assert!(!decider.is_explicit_method(false, true));
    }

    #[test]
    fn test_multilevel_needs_signing_baskets() {
        let decider = AuthorisationMethodDecider::new(true);
        assert!(decider.is_explicit_method(false, true));
        assert!(!decider.is_explicit_method(false, false));
    }
}
