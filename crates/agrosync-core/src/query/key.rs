use std::fmt;

use chrono::NaiveDate;

use crate::model::{FacilityId, PlotId};

/// Identifies one cached read: resource kind plus its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Facilities,
    FacilityPlots(FacilityId),
    FacilityIrrigations(FacilityId, Option<NaiveDate>),
    Responsibles(FacilityId),
    PlotState(PlotId),
    PlotHistory(PlotId),
    LastIrrigation(PlotId),
    Irrigations(PlotId),
    Thresholds(PlotId),
    Species,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facilities => f.write_str("facilities"),
            Self::FacilityPlots(id) => write!(f, "facilities/{id}/plots"),
            Self::FacilityIrrigations(id, Some(date)) => {
                write!(f, "facilities/{id}/irrigations?date={date}")
            }
            Self::FacilityIrrigations(id, None) => write!(f, "facilities/{id}/irrigations"),
            Self::Responsibles(id) => write!(f, "facilities/{id}/responsibles"),
            Self::PlotState(id) => write!(f, "plots/{id}/state"),
            Self::PlotHistory(id) => write!(f, "plots/{id}/history"),
            Self::LastIrrigation(id) => write!(f, "plots/{id}/last-irrigation"),
            Self::Irrigations(id) => write!(f, "plots/{id}/irrigations"),
            Self::Thresholds(id) => write!(f, "plots/{id}/thresholds"),
            Self::Species => f.write_str("species"),
        }
    }
}
