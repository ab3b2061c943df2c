// Wire types for the agrosync REST API.
//
// Field names follow the backend's JSON exactly; `agrosync-core` converts
// these into domain types. Timestamps stay as raw strings because the
// backend mixes ISO-8601 with key-prefixed forms such as `EVENT#<ts>`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Error body ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

// ── Facilities ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityResponse {
    pub facility_id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FacilitiesResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub facilities: Vec<FacilityResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFacilityBody {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFacilityResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub facility: FacilityResponse,
}

// ── Plots ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotResponse {
    pub plot_id: String,
    pub facility_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlotsResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub plots: Vec<PlotResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlotBody {
    pub facility_id: String,
    pub name: String,
    pub location: String,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlotResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub plot: PlotResponse,
}

// ── Sensor state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotStateResponse {
    pub plot_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub light: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlotHistoryResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub history: Vec<PlotStateResponse>,
}

// ── Irrigation ───────────────────────────────────────────────────────

/// A stored irrigation event. The backend is inconsistent about the
/// timestamp field, so both spellings and the sort key are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationEventResponse {
    #[serde(default, alias = "PlotId")]
    pub plot_id: Option<String>,
    #[serde(default, alias = "Timestamp")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub sk: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub water_amount: Option<f64>,
    #[serde(default, rename = "type")]
    pub irrigation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LastIrrigationResponse {
    pub plot_id: String,
    #[serde(default)]
    pub last_irrigation: Option<String>,
    pub details: IrrigationEventResponse,
}

#[derive(Debug, Deserialize)]
pub struct IrrigationsResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub irrigations: Vec<IrrigationEventResponse>,
}

#[derive(Debug, Deserialize)]
pub struct FacilityIrrigationEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub details: IrrigationEventResponse,
}

#[derive(Debug, Deserialize)]
pub struct FacilityIrrigationsResponse {
    pub facility_id: String,
    pub date: String,
    #[serde(default)]
    pub irrigations_by_plot: HashMap<String, Vec<FacilityIrrigationEntry>>,
    #[serde(default)]
    pub total_events: u64,
}

// ── Species ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesResponse {
    #[serde(default, alias = "pk")]
    pub species_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesListResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub species: Vec<SpeciesResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpeciesBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSpeciesResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub species: SpeciesResponse,
}

// ── Thresholds ───────────────────────────────────────────────────────

/// Full per-plot threshold object; both the GET body and the PUT payload.
///
/// Bounds always serialize, as `null` when unset, so a PUT replaces every
/// bound the backend holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsBody {
    pub species_id: String,
    #[serde(rename = "MinTemperature", default)]
    pub min_temperature: Option<f64>,
    #[serde(rename = "MaxTemperature", default)]
    pub max_temperature: Option<f64>,
    #[serde(rename = "MinHumidity", default)]
    pub min_humidity: Option<f64>,
    #[serde(rename = "MaxHumidity", default)]
    pub max_humidity: Option<f64>,
    #[serde(rename = "MinLight", default)]
    pub min_light: Option<f64>,
    #[serde(rename = "MaxLight", default)]
    pub max_light: Option<f64>,
    #[serde(rename = "MinIrrigation", default)]
    pub min_irrigation: Option<f64>,
    #[serde(rename = "MaxIrrigation", default)]
    pub max_irrigation: Option<f64>,
    #[serde(rename = "umbral_enabled", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// ── Responsibles ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiblesBody {
    pub responsibles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsiblesResponse {
    #[serde(default)]
    pub facility_id: Option<String>,
    #[serde(default)]
    pub responsibles: Vec<String>,
}
