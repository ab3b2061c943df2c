// ── Irrigation domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{FacilityId, PlotId};

/// How an irrigation was triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IrrigationKind {
    Manual,
    #[strum(to_string = "automatic", serialize = "auto", serialize = "scheduled")]
    Automatic,
    #[default]
    Unknown,
}

/// One stored irrigation. Append-only from the client's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub plot_id: Option<PlotId>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Minutes.
    pub duration: Option<f64>,
    /// Litres.
    pub water_amount: Option<f64>,
    pub kind: IrrigationKind,
}

impl IrrigationEvent {
    pub fn occurred_on(&self, date: NaiveDate) -> bool {
        self.timestamp.is_some_and(|ts| ts.date_naive() == date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastIrrigation {
    pub plot_id: PlotId,
    pub at: Option<DateTime<Utc>>,
    pub event: IrrigationEvent,
}

/// Irrigations of every plot in a facility on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityIrrigations {
    pub facility_id: FacilityId,
    pub date: NaiveDate,
    pub by_plot: BTreeMap<PlotId, Vec<IrrigationEvent>>,
    pub total_events: u64,
}

impl FacilityIrrigations {
    pub fn water_total(&self) -> f64 {
        self.by_plot
            .values()
            .flatten()
            .filter_map(|e| e.water_amount)
            .sum()
    }
}

/// Irrigation status of one plot as shown on its detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationSummary {
    pub plot_id: PlotId,
    pub last: Option<LastIrrigation>,
    pub total_events: usize,
    /// Litres applied on the summary date.
    pub water_today: f64,
}

impl IrrigationSummary {
    pub fn build(
        plot_id: PlotId,
        last: Option<LastIrrigation>,
        events: &[IrrigationEvent],
        today: NaiveDate,
    ) -> Self {
        Self {
            plot_id,
            last,
            total_events: events.len(),
            water_today: water_used_on(events, today),
        }
    }
}

/// Sum of water applied by events that happened on `date` (UTC).
pub fn water_used_on(events: &[IrrigationEvent], date: NaiveDate) -> f64 {
    events
        .iter()
        .filter(|e| e.occurred_on(date))
        .filter_map(|e| e.water_amount)
        .sum()
}
