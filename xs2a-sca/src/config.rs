//! Configuration for the SCA core

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use xs2a_model::ScaApproach;

/// Configuration options for the SCA core, normally taken from the ASPSP
/// profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaConfig {
    /// Supported SCA approaches, in order of preference
    pub supported_approaches: Vec<ScaApproach>,

    /// Base URL of the XS2A interface, used for navigation links
    pub xs2a_base_url: String,

    /// ASPSP redirect URL template for payment initiation
    pub pis_redirect_url: String,

    /// ASPSP redirect URL template for payment cancellation
    pub pis_cancellation_redirect_url: String,

    /// ASPSP redirect URL template for consents
    pub ais_redirect_url: String,

    /// Whether the ASPSP supports signing baskets
    pub signing_basket_supported: bool,
}

impl ScaConfig {
    /// Creates a new ScaConfig with the given approaches and base URL
    pub fn new(supported_approaches: Vec<ScaApproach>, xs2a_base_url: &str) -> Self {
        Self {
            supported_approaches,
            xs2a_base_url: xs2a_base_url.to_string(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScaConfig = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("Invalid SCA configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the supported approaches
    pub fn with_supported_approaches(mut self, approaches: Vec<ScaApproach>) -> Self {
        self.supported_approaches = approaches;
        self
    }

    /// Sets the XS2A base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.xs2a_base_url = base_url.to_string();
        self
    }

    /// Sets the redirect URL templates for payments, cancellations and consents
    pub fn with_redirect_urls(mut self, pis: &str, pis_cancellation: &str, ais: &str) -> Self {
        self.pis_redirect_url = pis.to_string();
        self.pis_cancellation_redirect_url = pis_cancellation.to_string();
        self.ais_redirect_url = ais.to_string();
        self
    }

    /// Enables or disables signing basket support
    pub fn with_signing_basket_supported(mut self, supported: bool) -> Self {
        self.signing_basket_supported = supported;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.supported_approaches.is_empty() {
            return Err(Error::Configuration(
                "At least one SCA approach must be supported".to_string(),
            ));
        }

        for (i, approach) in self.supported_approaches.iter().enumerate() {
            if self.supported_approaches[..i].contains(approach) {
                return Err(Error::Configuration(format!(
                    "SCA approach {} configured more than once",
                    approach
                )));
            }
        }

        Url::parse(&self.xs2a_base_url).map_err(|e| {
            Error::Configuration(format!(
                "Invalid XS2A base URL {}: {}",
                self.xs2a_base_url, e
            ))
        })?;

        if self.supported_approaches.contains(&ScaApproach::Redirect) {
            let templates = [
                ("PIS", &self.pis_redirect_url),
                ("PIS cancellation", &self.pis_cancellation_redirect_url),
                ("AIS", &self.ais_redirect_url),
            ];
            for (name, template) in templates {
                if template.trim().is_empty() {
                    return Err(Error::Configuration(format!(
                        "{} redirect URL is required for the REDIRECT approach",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for ScaConfig {
    fn default() -> Self {
        Self {
            supported_approaches: vec![ScaApproach::Embedded],
            xs2a_base_url: "http://localhost:8080".to_string(),
            pis_redirect_url: String::new(),
            pis_cancellation_redirect_url: String::new(),
            ais_redirect_url: String::new(),
            signing_basket_supported: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_is_valid() {
        assert!(ScaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_approaches_rejected() {
        let config = ScaConfig::default().with_supported_approaches(vec![]);
        assert_matches!(config.validate(), Err(Error::Configuration(_)));
    }

    #[test]
    fn test_duplicate_approach_rejected() {
        let config = ScaConfig::default()
            .with_supported_approaches(vec![ScaApproach::Embedded, ScaApproach::Embedded]);
        assert_matches!(config.validate(), Err(Error::Configuration(_)));
    }

    #[test]
    fn test_redirect_requires_templates() {
        let config = ScaConfig::default()
            .with_supported_approaches(vec![ScaApproach::Redirect, ScaApproach::Embedded]);
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        let config = config.with_redirect_urls(
            "https://aspsp/pis/{redirect-id}/{encrypted-payment-id}",
            "https://aspsp/pis/cancellation/{redirect-id}/{encrypted-payment-id}",
            "https://aspsp/ais/{redirect-id}/{encrypted-consent-id}",
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = ScaConfig::from_json(
            r#"{
                "supportedApproaches": ["DECOUPLED", "EMBEDDED"],
                "xs2aBaseUrl": "http://url",
                "signingBasketSupported": true
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.supported_approaches,
            vec![ScaApproach::Decoupled, ScaApproach::Embedded]
        );
        assert!(config.signing_basket_supported);

        assert_matches!(
            ScaConfig::from_json(r#"{"supportedApproaches": []}"#),
            Err(Error::Configuration(_))
        );
        assert_matches!(
            ScaConfig::from_json(r#"{"supportedApproaches": ["PIGEON"]}"#),
            Err(Error::Configuration(_))
        );
    }
}
