// ── Responsibles editor ──
//
// Add and remove are optimistic: the proposed set is shown at once, the
// full set is PUT (last write wins), and a failure rolls the view back to
// the last acknowledged set. Edits are not queued; two in-flight edits
// race and the later acknowledgment is kept.

use std::sync::Arc;

use tracing::info;

use crate::dashboard::DashboardInner;
use crate::error::CoreError;
use crate::model::{FacilityId, ResponsibleSet};
use crate::mutation::OptimisticState;
use crate::query::QueryKey;
use crate::stream::StateStream;

pub struct ResponsiblesEditor {
    facility_id: FacilityId,
    inner: Arc<DashboardInner>,
    state: OptimisticState<ResponsibleSet>,
}

impl ResponsiblesEditor {
    pub(crate) fn new(
        facility_id: FacilityId,
        inner: Arc<DashboardInner>,
        initial: ResponsibleSet,
    ) -> Self {
        Self {
            facility_id,
            inner,
            state: OptimisticState::new(initial),
        }
    }

    pub fn facility_id(&self) -> &FacilityId {
        &self.facility_id
    }

    /// The set shown to the operator, including an unacknowledged edit.
    pub fn displayed(&self) -> Arc<ResponsibleSet> {
        self.state.displayed()
    }

    /// The last set the backend acknowledged.
    pub fn committed(&self) -> Arc<ResponsibleSet> {
        self.state.committed()
    }

    pub fn subscribe(&self) -> StateStream<Arc<ResponsibleSet>> {
        self.state.subscribe()
    }

    /// Add an address. Input problems fail before any network call.
    pub async fn add(&self, email: &str) -> Result<Arc<ResponsibleSet>, CoreError> {
        let next = self.state.displayed().with_added(email)?;
        self.replace(next).await
    }

    /// Remove an address that is currently listed.
    pub async fn remove(&self, email: &str) -> Result<Arc<ResponsibleSet>, CoreError> {
        let next = self.state.displayed().with_removed(email)?;
        self.replace(next).await
    }

    async fn replace(&self, next: ResponsibleSet) -> Result<Arc<ResponsibleSet>, CoreError> {
        let api = &self.inner.api;
        let facility = self.facility_id.as_str();

        let result = self
            .inner
            .mutate_optimistic(&self.state, next, |proposed| async move {
                let stored = api.put_responsibles(facility, &proposed.to_wire()).await?;
                Ok::<_, CoreError>(ResponsibleSet::from_server(stored))
            })
            .await?;

        self.inner
            .cache
            .invalidate(&QueryKey::Responsibles(self.facility_id.clone()));
        info!(facility = %self.facility_id, count = result.len(), "responsibles updated");
        Ok(result)
    }
}
