//! SCA status and SCA approach.
//!
//! The status models the lifecycle of a single authorisation:
//!
//! ```text
//!   received ──▶ psuIdentified ──▶ psuAuthenticated ──▶ scaMethodSelected ──▶ finalised
//!      │               │                  │                     │
//!      └───────────────┴──────────────────┴─────────────────────┴──────────▶ failed
//! ```
//!
//! Steps may be skipped (a decoupled flow jumps from `received` straight to
//! `scaMethodSelected`), but a status never moves backwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an SCA authorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaStatus {
    /// Authorisation created, nothing known about the PSU yet.
    Received,
    /// The PSU has been identified but not authenticated.
    PsuIdentified,
    /// The PSU has been authenticated with static credentials.
    PsuAuthenticated,
    /// An SCA method has been chosen (or auto-selected).
    ScaMethodSelected,
    /// SCA completed successfully. Terminal.
    Finalised,
    /// SCA failed. Terminal.
    Failed,
}

impl ScaStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ScaStatus; 6] = [
        ScaStatus::Received,
        ScaStatus::PsuIdentified,
        ScaStatus::PsuAuthenticated,
        ScaStatus::ScaMethodSelected,
        ScaStatus::Finalised,
        ScaStatus::Failed,
    ];

    /// Position of the status along the forward lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            ScaStatus::Received => 0,
            ScaStatus::PsuIdentified => 1,
            ScaStatus::PsuAuthenticated => 2,
            ScaStatus::ScaMethodSelected => 3,
            ScaStatus::Finalised => 4,
            ScaStatus::Failed => 5,
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScaStatus::Finalised | ScaStatus::Failed)
    }

    /// Returns true if moving from `self` to `next` keeps the lifecycle
    /// monotonic. Staying in place is always allowed; `failed` is reachable
    /// from every non-terminal status.
    pub fn can_transition_to(&self, next: ScaStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        next == ScaStatus::Failed || next.rank() > self.rank()
    }

    /// Upper-case constant name, as used in stage keys (`SCAMETHODSELECTED`).
    pub fn name(&self) -> &'static str {
        match self {
            ScaStatus::Received => "RECEIVED",
            ScaStatus::PsuIdentified => "PSUIDENTIFIED",
            ScaStatus::PsuAuthenticated => "PSUAUTHENTICATED",
            ScaStatus::ScaMethodSelected => "SCAMETHODSELECTED",
            ScaStatus::Finalised => "FINALISED",
            ScaStatus::Failed => "FAILED",
        }
    }

    /// XS2A wire value (`scaMethodSelected`).
    pub fn value(&self) -> &'static str {
        match self {
            ScaStatus::Received => "received",
            ScaStatus::PsuIdentified => "psuIdentified",
            ScaStatus::PsuAuthenticated => "psuAuthenticated",
            ScaStatus::ScaMethodSelected => "scaMethodSelected",
            ScaStatus::Finalised => "finalised",
            ScaStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ScaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for ScaStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        ScaStatus::ALL
            .iter()
            .copied()
            .find(|status| status.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| Error::UnknownScaStatus(s.to_string()))
    }
}

/// The way the PSU performs SCA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaApproach {
    /// All PSU interaction happens through the XS2A API itself.
    Embedded,
    /// The PSU confirms in a separate bank channel (e.g. a banking app).
    Decoupled,
    /// The PSU is redirected to the ASPSP's web interface.
    Redirect,
    /// The PSU authorises via an OAuth token exchange.
    #[serde(rename = "OAUTH")]
    OAuth,
}

impl ScaApproach {
    /// All approaches.
    pub const ALL: [ScaApproach; 4] = [
        ScaApproach::Embedded,
        ScaApproach::Decoupled,
        ScaApproach::Redirect,
        ScaApproach::OAuth,
    ];

    /// Returns true if PSU data updates for this approach are driven by
    /// stage handlers (embedded and decoupled).
    pub fn has_embedded_stages(&self) -> bool {
        matches!(self, ScaApproach::Embedded | ScaApproach::Decoupled)
    }

    /// Upper-case constant name.
    pub fn name(&self) -> &'static str {
        match self {
            ScaApproach::Embedded => "EMBEDDED",
            ScaApproach::Decoupled => "DECOUPLED",
            ScaApproach::Redirect => "REDIRECT",
            ScaApproach::OAuth => "OAUTH",
        }
    }
}

impl fmt::Display for ScaApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScaApproach {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScaApproach::ALL
            .iter()
            .copied()
            .find(|approach| approach.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownScaApproach(s.to_string()))
    }
}
