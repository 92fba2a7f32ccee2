//! In-memory consent management backend

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use xs2a_model::{Authorisation, AuthorisationFlow, ScaApproach, TransitionResult};

use crate::cms::{AuthorisationBackend, CmsError};

/// Authorisation store backed by a concurrent map
///
/// Applies the same invariants a real CMS enforces: statuses never move
/// backwards and an approach that was switched to decoupled is never switched
/// back.
#[derive(Debug, Default)]
pub struct InMemoryCms {
    authorisations: DashMap<String, Authorisation>,
}

impl InMemoryCms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub fn insert(&self, authorisation: Authorisation) {
        self.authorisations
            .insert(authorisation.authorisation_id.clone(), authorisation);
    }

    /// Snapshot of a stored record, ignoring the flow.
    pub fn get(&self, authorisation_id: &str) -> Option<Authorisation> {
        self.authorisations
            .get(authorisation_id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.authorisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorisations.is_empty()
    }

    fn find(&self, authorisation_id: &str, flow: AuthorisationFlow) -> Option<Authorisation> {
        self.authorisations
            .get(authorisation_id)
            .filter(|entry| entry.flow == flow)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl AuthorisationBackend for InMemoryCms {
    async fn get_authorisation(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<Authorisation>, CmsError> {
        Ok(self.find(authorisation_id, flow))
    }

    async fn get_sca_approach(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<ScaApproach>, CmsError> {
        Ok(self
            .find(authorisation_id, flow)
            .and_then(|authorisation| authorisation.sca_approach))
    }

    async fn save_transition(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
        result: &TransitionResult,
    ) -> Result<(), CmsError> {
        let mut entry = self
            .authorisations
            .get_mut(authorisation_id)
            .filter(|entry| entry.flow == flow)
            .ok_or_else(|| CmsError::NotFound(authorisation_id.to_string()))?;

        if !entry.sca_status.can_transition_to(result.sca_status) {
            return Err(CmsError::Conflict(format!(
                "Status of {} cannot move from {} to {}",
                authorisation_id, entry.sca_status, result.sca_status
            )));
        }

        if let Some(approach) = result.sca_approach {
            if entry.sca_approach == Some(ScaApproach::Decoupled) && approach != ScaApproach::Decoupled
            {
                return Err(CmsError::Conflict(format!(
                    "Approach of {} cannot change from DECOUPLED to {}",
                    authorisation_id, approach
                )));
            }
            entry.sca_approach = Some(approach);
        }

        entry.sca_status = result.sca_status;
        if result.chosen_sca_method.is_some() {
            entry.chosen_sca_method = result.chosen_sca_method.clone();
        }
        if !result.available_sca_methods.is_empty() {
            entry.available_sca_methods = result.available_sca_methods.clone();
        }
        if result.psu_data.is_not_empty() {
            entry.psu_data = result.psu_data.clone();
        }
        entry.updated_at = Utc::now();

        debug!(
            authorisation_id = %authorisation_id,
            status = %entry.sca_status,
            "Stored authorisation transition"
        );
        Ok(())
    }

    async fn create_authorisation(
        &self,
        authorisation: Authorisation,
    ) -> Result<Authorisation, CmsError> {
        match self
            .authorisations
            .entry(authorisation.authorisation_id.clone())
        {
            Entry::Occupied(_) => Err(CmsError::Conflict(format!(
                "Authorisation {} already exists",
                authorisation.authorisation_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(authorisation.clone());
                Ok(authorisation)
            }
        }
    }
}
