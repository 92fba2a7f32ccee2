//! PSU identification data.

use serde::{Deserialize, Serialize};

/// Identification of the Payment Service User.
///
/// Every field is optional. A value with no non-blank field is "empty" and
/// stands for an anonymous, not yet identified PSU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsuIdData {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_id_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_corporate_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psu_corporate_id_type: Option<String>,
}

impl PsuIdData {
    /// Create PSU data carrying only a PSU id.
    pub fn new(psu_id: &str) -> Self {
        Self {
            psu_id: Some(psu_id.to_string()),
            ..Default::default()
        }
    }

    /// An anonymous PSU.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_id_type(mut self, psu_id_type: &str) -> Self {
        self.psu_id_type = Some(psu_id_type.to_string());
        self
    }

    pub fn with_corporate_id(mut self, corporate_id: &str, corporate_id_type: Option<&str>) -> Self {
        self.psu_corporate_id = Some(corporate_id.to_string());
        self.psu_corporate_id_type = corporate_id_type.map(str::to_string);
        self
    }

    /// Returns true if no field carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        [
            &self.psu_id,
            &self.psu_id_type,
            &self.psu_corporate_id,
            &self.psu_corporate_id_type,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }
}

/// Returns the first non-empty PSU data, if any.
///
/// A PSU may be known from the resource (payment/consent creation headers) or
/// from the authorisation request; either one is enough.
pub fn first_present<'a>(candidates: &[&'a PsuIdData]) -> Option<&'a PsuIdData> {
    candidates.iter().copied().find(|psu| psu.is_not_empty())
}
