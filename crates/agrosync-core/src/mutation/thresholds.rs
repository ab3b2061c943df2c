// ── Threshold editor ──
//
// Editing is buffered: changes go to a draft that only reaches the
// backend on save. Phases:
//
//   Viewing ──begin_edit──▶ Editing ──save──▶ Saving ──ok──▶ Viewing
//                              │                 └──err──▶ Editing (draft kept)
//                              └──cancel──▶ Viewing
//
// The alerting switch is the exception: it is flipped optimistically and
// only while Viewing. The editor sits in Saving until the toggle is
// acknowledged, so an edit cannot start from the pre-toggle thresholds.

use std::sync::Arc;

use strum::Display;
use tokio::sync::Mutex;
use tracing::{info, warn};

use agrosync_api::types::ThresholdsBody;

use crate::dashboard::DashboardInner;
use crate::error::CoreError;
use crate::model::{Bounds, MonitoredVariable, PlotId, SpeciesThresholds};
use crate::mutation::OptimisticState;
use crate::query::QueryKey;
use crate::stream::StateStream;

/// Where the editor is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ThresholdPhase {
    Viewing,
    Editing,
    Saving,
}

enum Phase {
    Viewing,
    Editing(SpeciesThresholds),
    Saving(SpeciesThresholds),
}

impl Phase {
    fn public(&self) -> ThresholdPhase {
        match self {
            Self::Viewing => ThresholdPhase::Viewing,
            Self::Editing(_) => ThresholdPhase::Editing,
            Self::Saving(_) => ThresholdPhase::Saving,
        }
    }

    fn reject(&self, action: &'static str) -> CoreError {
        let state = match self {
            Self::Viewing => "viewing",
            Self::Editing(_) => "editing",
            Self::Saving(_) => "saving",
        };
        CoreError::InvalidTransition { action, state }
    }
}

pub struct ThresholdEditor {
    plot_id: PlotId,
    inner: Arc<DashboardInner>,
    /// `None` until thresholds are configured for the plot.
    state: OptimisticState<Option<SpeciesThresholds>>,
    phase: Mutex<Phase>,
}

impl ThresholdEditor {
    pub(crate) fn new(
        plot_id: PlotId,
        inner: Arc<DashboardInner>,
        initial: Option<SpeciesThresholds>,
    ) -> Self {
        Self {
            plot_id,
            inner,
            state: OptimisticState::new(initial),
            phase: Mutex::new(Phase::Viewing),
        }
    }

    pub fn plot_id(&self) -> &PlotId {
        &self.plot_id
    }

    pub async fn phase(&self) -> ThresholdPhase {
        self.phase.lock().await.public()
    }

    /// Last thresholds the backend acknowledged.
    pub fn committed(&self) -> Option<SpeciesThresholds> {
        (*self.state.committed()).clone()
    }

    /// Thresholds shown outside the edit form, including an
    /// unacknowledged toggle.
    pub fn displayed(&self) -> Option<SpeciesThresholds> {
        (*self.state.displayed()).clone()
    }

    pub fn subscribe(&self) -> StateStream<Arc<Option<SpeciesThresholds>>> {
        self.state.subscribe()
    }

    /// The pending draft while Editing or Saving.
    pub async fn draft(&self) -> Option<SpeciesThresholds> {
        match &*self.phase.lock().await {
            Phase::Editing(draft) | Phase::Saving(draft) => Some(draft.clone()),
            Phase::Viewing => None,
        }
    }

    /// Viewing → Editing. The draft starts as a copy of the committed
    /// thresholds (or empty when none exist).
    pub async fn begin_edit(&self) -> Result<SpeciesThresholds, CoreError> {
        let mut phase = self.phase.lock().await;
        if !matches!(*phase, Phase::Viewing) {
            return Err(phase.reject("edit"));
        }
        let draft = self.committed().unwrap_or_default();
        *phase = Phase::Editing(draft.clone());
        Ok(draft)
    }

    /// Change the draft in place.
    pub async fn edit<F>(&self, change: F) -> Result<SpeciesThresholds, CoreError>
    where
        F: FnOnce(&mut SpeciesThresholds),
    {
        let mut phase = self.phase.lock().await;
        match &mut *phase {
            Phase::Editing(draft) => {
                change(draft);
                Ok(draft.clone())
            }
            other => Err(other.reject("change the draft")),
        }
    }

    pub async fn set_bounds(
        &self,
        variable: MonitoredVariable,
        bounds: Bounds,
    ) -> Result<SpeciesThresholds, CoreError> {
        self.edit(|draft| *draft.bounds_mut(variable) = bounds).await
    }

    pub async fn set_species(&self, species_id: &str) -> Result<SpeciesThresholds, CoreError> {
        let species_id = species_id.trim().to_owned();
        self.edit(|draft| draft.species_id = species_id).await
    }

    /// Editing → Viewing, dropping the draft. Committed is untouched.
    pub async fn cancel(&self) -> Result<(), CoreError> {
        let mut phase = self.phase.lock().await;
        if !matches!(*phase, Phase::Editing(_)) {
            return Err(phase.reject("cancel"));
        }
        *phase = Phase::Viewing;
        Ok(())
    }

    /// Editing → Saving → Viewing. An invalid draft or a failed request
    /// leaves the editor in Editing with the draft intact.
    pub async fn save(&self) -> Result<SpeciesThresholds, CoreError> {
        let draft = {
            let mut phase = self.phase.lock().await;
            let Phase::Editing(draft) = &*phase else {
                return Err(phase.reject("save"));
            };
            draft.validate()?;
            let draft = draft.clone();
            *phase = Phase::Saving(draft.clone());
            draft
        };

        let body = ThresholdsBody::from(&draft);
        let result = self
            .inner
            .mutate(self.inner.api.put_plot_thresholds(self.plot_id.as_str(), &body))
            .await;

        let mut phase = self.phase.lock().await;
        match result {
            Ok(stored) => {
                let stored = SpeciesThresholds::from(stored);
                self.state.commit(Some(stored.clone()));
                *phase = Phase::Viewing;
                drop(phase);
                self.inner
                    .cache
                    .invalidate(&QueryKey::Thresholds(self.plot_id.clone()));
                info!(plot = %self.plot_id, "thresholds saved");
                Ok(stored)
            }
            Err(err) => {
                *phase = Phase::Editing(draft);
                warn!(plot = %self.plot_id, error = %err, "threshold save failed");
                Err(err)
            }
        }
    }

    /// Flip the alerting switch. Only accepted while Viewing.
    pub async fn toggle_enabled(&self) -> Result<SpeciesThresholds, CoreError> {
        let next = {
            let mut phase = self.phase.lock().await;
            if !matches!(*phase, Phase::Viewing) {
                return Err(phase.reject("toggle alerts"));
            }
            let Some(current) = self.displayed() else {
                return Err(CoreError::validation(
                    "No thresholds are configured for this plot",
                ));
            };
            let next = current.toggled();
            *phase = Phase::Saving(next.clone());
            next
        };

        let api = &self.inner.api;
        let plot = self.plot_id.as_str();
        let result = self
            .inner
            .mutate_optimistic(&self.state, Some(next), |proposed| async move {
                let body = proposed
                    .as_ref()
                    .as_ref()
                    .map(ThresholdsBody::from)
                    .unwrap_or_default();
                let stored = api.put_plot_thresholds(plot, &body).await?;
                Ok::<_, CoreError>(Some(SpeciesThresholds::from(stored)))
            })
            .await;
        *self.phase.lock().await = Phase::Viewing;
        let acknowledged = result?;

        self.inner
            .cache
            .invalidate(&QueryKey::Thresholds(self.plot_id.clone()));
        let acknowledged = (*acknowledged)
            .clone()
            .ok_or_else(|| CoreError::Internal("thresholds missing after toggle".into()))?;
        info!(plot = %self.plot_id, enabled = acknowledged.enabled, "alerting switched");
        Ok(acknowledged)
    }
}
