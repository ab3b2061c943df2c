// ── API-to-domain type conversions ──
//
// Bridges raw `agrosync_api::types` into canonical `agrosync_core::model`
// types. Timestamps are normalized through `format::parse_timestamp`;
// unparseable optional values are dropped rather than failing the read.

use chrono::NaiveDate;

use agrosync_api::types::{
    CreatePlotBody, FacilityIrrigationsResponse, FacilityResponse, IrrigationEventResponse,
    LastIrrigationResponse, PlotResponse, PlotStateResponse, SpeciesResponse, ThresholdsBody,
};

use crate::error::CoreError;
use crate::format::parse_timestamp;
use crate::model::{
    Bounds, Facility, FacilityId, FacilityIrrigations, IrrigationEvent, IrrigationKind,
    LastIrrigation, NewPlot, Plot, PlotId, PlotState, Species, SpeciesId, SpeciesThresholds,
};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_opt(raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    raw.and_then(parse_timestamp)
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Facility / Plot ────────────────────────────────────────────────

impl From<FacilityResponse> for Facility {
    fn from(f: FacilityResponse) -> Self {
        Self {
            id: FacilityId::from(f.facility_id),
            name: f.name,
            location: non_empty(f.location),
            created_at: parse_opt(f.created_at.as_deref()),
        }
    }
}

impl From<PlotResponse> for Plot {
    fn from(p: PlotResponse) -> Self {
        Self {
            id: PlotId::from(p.plot_id),
            facility_id: FacilityId::from(p.facility_id),
            name: non_empty(p.name),
            location: non_empty(p.location),
            species: non_empty(p.species),
            area: p.area,
            mac_address: non_empty(p.mac_address),
            created_at: parse_opt(p.created_at.as_deref()),
            updated_at: parse_opt(p.updated_at.as_deref()),
        }
    }
}

impl From<NewPlot> for CreatePlotBody {
    fn from(p: NewPlot) -> Self {
        Self {
            facility_id: p.facility_id.to_string(),
            name: p.name,
            location: p.location,
            mac_address: p.mac_address,
            species: p.species,
            area: p.area,
        }
    }
}

impl From<PlotStateResponse> for PlotState {
    fn from(s: PlotStateResponse) -> Self {
        Self {
            plot_id: PlotId::from(s.plot_id),
            timestamp: parse_timestamp(&s.timestamp),
            temperature: s.temperature,
            humidity: s.humidity,
            soil_moisture: s.soil_moisture,
            light: s.light,
        }
    }
}

// ── Irrigation ─────────────────────────────────────────────────────

impl From<IrrigationEventResponse> for IrrigationEvent {
    fn from(e: IrrigationEventResponse) -> Self {
        // The sort key carries the timestamp when the attribute is missing.
        let timestamp = parse_opt(e.timestamp.as_deref()).or_else(|| parse_opt(e.sk.as_deref()));
        let kind = e
            .irrigation_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(IrrigationKind::Unknown);
        Self {
            plot_id: e.plot_id.map(PlotId::from),
            timestamp,
            duration: e.duration,
            water_amount: e.water_amount,
            kind,
        }
    }
}

impl From<LastIrrigationResponse> for LastIrrigation {
    fn from(r: LastIrrigationResponse) -> Self {
        let event = IrrigationEvent::from(r.details);
        Self {
            at: parse_opt(r.last_irrigation.as_deref()).or(event.timestamp),
            plot_id: PlotId::from(r.plot_id),
            event,
        }
    }
}

impl TryFrom<FacilityIrrigationsResponse> for FacilityIrrigations {
    type Error = CoreError;

    fn try_from(r: FacilityIrrigationsResponse) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").map_err(|e| {
            CoreError::Transient {
                message: format!("unexpected irrigation date {:?}: {e}", r.date),
                status: None,
            }
        })?;
        let by_plot = r
            .irrigations_by_plot
            .into_iter()
            .map(|(plot, entries)| {
                let events = entries
                    .into_iter()
                    .map(|entry| {
                        let mut event = IrrigationEvent::from(entry.details);
                        if let Some(ts) = parse_opt(entry.timestamp.as_deref()) {
                            event.timestamp = Some(ts);
                        }
                        event
                    })
                    .collect();
                (PlotId::from(plot), events)
            })
            .collect();
        Ok(Self {
            facility_id: FacilityId::from(r.facility_id),
            date,
            by_plot,
            total_events: r.total_events,
        })
    }
}

// ── Species / Thresholds ───────────────────────────────────────────

impl From<SpeciesResponse> for Species {
    fn from(s: SpeciesResponse) -> Self {
        Self {
            id: non_empty(s.species_id).map(SpeciesId::from),
            name: s.name,
        }
    }
}

impl From<ThresholdsBody> for SpeciesThresholds {
    fn from(t: ThresholdsBody) -> Self {
        Self {
            species_id: t.species_id,
            temperature: Bounds::new(t.min_temperature, t.max_temperature),
            humidity: Bounds::new(t.min_humidity, t.max_humidity),
            light: Bounds::new(t.min_light, t.max_light),
            irrigation: Bounds::new(t.min_irrigation, t.max_irrigation),
            enabled: t.enabled.unwrap_or(false),
        }
    }
}

impl From<&SpeciesThresholds> for ThresholdsBody {
    fn from(t: &SpeciesThresholds) -> Self {
        Self {
            species_id: t.species_id.clone(),
            min_temperature: t.temperature.min,
            max_temperature: t.temperature.max,
            min_humidity: t.humidity.min,
            max_humidity: t.humidity.max,
            min_light: t.light.min,
            max_light: t.light.max,
            min_irrigation: t.irrigation.min,
            max_irrigation: t.irrigation.max,
            enabled: Some(t.enabled),
        }
    }
}
