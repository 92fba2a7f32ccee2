use crate::config::ScaConfig;
use crate::error::{Error, Result};
use xs2a_model::ScaApproach;

/// ASPSP-configured approaches, in order of preference
///
/// Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproachRegistry {
    approaches: Vec<ScaApproach>,
}

impl ApproachRegistry {
    /// Create a registry. An empty list is a configuration error.
    pub fn new(approaches: Vec<ScaApproach>) -> Result<Self> {
        if approaches.is_empty() {
            return Err(Error::Configuration(
                "At least one SCA approach must be supported".to_string(),
            ));
        }
        Ok(Self { approaches })
    }

    pub fn from_config(config: &ScaConfig) -> Result<Self> {
        Self::new(config.supported_approaches.clone())
    }

    /// Approach for an authorisation that does not exist yet.
    pub fn initial_approach(&self) -> ScaApproach {
        self.approaches[0]
    }

    pub fn is_supported(&self, approach: ScaApproach) -> bool {
        self.approaches.contains(&approach)
    }

    pub fn approaches(&self) -> &[ScaApproach] {
        &self.approaches
    }
}
