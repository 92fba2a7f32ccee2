//! Navigation links returned to the TPP.
//!
//! [`LinkSet`] is the semantic result of link derivation (which links, not
//! where they point). [`Links`] is the transport form: an ordered map from
//! link name to `{"href": ...}`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Semantic name of a navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    StartAuthorisation,
    StartAuthorisationWithPsuIdentification,
    StartAuthorisationWithPsuAuthentication,
    UpdatePsuIdentification,
    UpdatePsuAuthentication,
    SelectAuthenticationMethod,
    AuthoriseTransaction,
    ScaRedirect,
    #[serde(rename = "scaOAuth")]
    ScaOAuth,
    ScaStatus,
    #[serde(rename = "self")]
    SelfLink,
    Status,
}

impl LinkType {
    /// Name of the link in the XS2A `_links` object.
    pub fn name(&self) -> &'static str {
        match self {
            LinkType::StartAuthorisation => "startAuthorisation",
            LinkType::StartAuthorisationWithPsuIdentification => {
                "startAuthorisationWithPsuIdentification"
            }
            LinkType::StartAuthorisationWithPsuAuthentication => {
                "startAuthorisationWithPsuAuthentication"
            }
            LinkType::UpdatePsuIdentification => "updatePsuIdentification",
            LinkType::UpdatePsuAuthentication => "updatePsuAuthentication",
            LinkType::SelectAuthenticationMethod => "selectAuthenticationMethod",
            LinkType::AuthoriseTransaction => "authoriseTransaction",
            LinkType::ScaRedirect => "scaRedirect",
            LinkType::ScaOAuth => "scaOAuth",
            LinkType::ScaStatus => "scaStatus",
            LinkType::SelfLink => "self",
            LinkType::Status => "status",
        }
    }

    /// `self` and `status` point at the payment or consent itself.
    pub fn targets_resource(&self) -> bool {
        matches!(self, LinkType::SelfLink | LinkType::Status)
    }

    /// Start-authorisation links point at the authorisation collection of
    /// the resource; every other link points at one authorisation.
    pub fn targets_collection(&self) -> bool {
        matches!(
            self,
            LinkType::StartAuthorisation
                | LinkType::StartAuthorisationWithPsuIdentification
                | LinkType::StartAuthorisationWithPsuAuthentication
        )
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set of links a response must carry, without URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSet(BTreeSet<LinkType>);

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(links: &[LinkType]) -> Self {
        Self(links.iter().copied().collect())
    }

    pub fn insert(&mut self, link: LinkType) -> &mut Self {
        self.0.insert(link);
        self
    }

    pub fn contains(&self, link: LinkType) -> bool {
        self.0.contains(&link)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LinkType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<LinkType> for LinkSet {
    fn from_iter<I: IntoIterator<Item = LinkType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

/// Links in transport form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<LinkType, Href>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, link: LinkType, href: impl Into<String>) {
        self.0.insert(link, Href { href: href.into() });
    }

    pub fn get(&self, link: LinkType) -> Option<&str> {
        self.0.get(&link).map(|h| h.href.as_str())
    }

    pub fn contains(&self, link: LinkType) -> bool {
        self.0.contains_key(&link)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The semantic link types present, without targets.
    pub fn link_set(&self) -> LinkSet {
        self.0.keys().copied().collect()
    }
}
