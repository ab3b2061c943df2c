// ── Domain model ──
//
// Canonical types the dashboard works with. Built from wire types in
// `convert`; never serialized back to the backend directly.

pub mod facility;
pub mod ids;
pub mod irrigation;
pub mod plot;
pub mod responsibles;
pub mod species;
pub mod thresholds;

pub use facility::{Facility, NewFacility};
pub use ids::{FacilityId, PlotId, SpeciesId};
pub use irrigation::{
    FacilityIrrigations, IrrigationEvent, IrrigationKind, IrrigationSummary, LastIrrigation,
    water_used_on,
};
pub use plot::{NewPlot, Plot, PlotState, SensorVariable};
pub use responsibles::{EmailAddress, ResponsibleSet};
pub use species::Species;
pub use thresholds::{Bounds, MonitoredVariable, SpeciesThresholds};
