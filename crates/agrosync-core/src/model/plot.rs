// ── Plot and sensor-state domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::ids::{FacilityId, PlotId};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub facility_id: FacilityId,
    pub name: Option<String>,
    pub location: Option<String>,
    /// Species name as entered when the plot was created.
    pub species: Option<String>,
    /// Area in square metres.
    pub area: Option<f64>,
    /// Hardware address of the sensor node attached to the plot.
    pub mac_address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Plot {
    /// Name to show in lists; falls back to `Plot <short id>`.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("Plot {}", self.id.short()),
        }
    }
}

/// Input for creating a plot.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlot {
    pub facility_id: FacilityId,
    pub name: String,
    pub location: String,
    pub mac_address: String,
    pub species: Option<String>,
    pub area: Option<f64>,
}

impl NewPlot {
    /// Trim text fields and reject the missing required ones.
    pub fn validated(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_owned();
        let location = self.location.trim().to_owned();
        let mac_address = self.mac_address.trim().to_owned();
        if name.is_empty() {
            return Err(CoreError::validation("Plot name is required"));
        }
        if location.is_empty() {
            return Err(CoreError::validation("Plot location is required"));
        }
        if mac_address.is_empty() {
            return Err(CoreError::validation("Hardware address is required"));
        }
        if self.area.is_some_and(|a| !a.is_finite() || a < 0.0) {
            return Err(CoreError::validation("Area must be a positive number"));
        }
        let species = self
            .species
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        Ok(Self {
            facility_id: self.facility_id,
            name,
            location,
            mac_address,
            species,
            area: self.area,
        })
    }
}

// ── Sensor state ────────────────────────────────────────────────────

/// A variable reported by a plot's sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SensorVariable {
    Temperature,
    Humidity,
    #[strum(to_string = "Soil moisture")]
    SoilMoisture,
    Light,
}

impl SensorVariable {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity | Self::SoilMoisture => "%",
            Self::Light => "lux",
        }
    }

    /// Decimal places used when displaying a reading.
    pub fn precision(self) -> usize {
        match self {
            Self::Light => 0,
            _ => 1,
        }
    }
}

/// One sensor snapshot. Replaced wholesale on every refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotState {
    pub plot_id: PlotId,
    /// `None` when the backend sent a timestamp that could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub light: Option<f64>,
}

impl PlotState {
    pub fn reading(&self, variable: SensorVariable) -> Option<f64> {
        match variable {
            SensorVariable::Temperature => self.temperature,
            SensorVariable::Humidity => self.humidity,
            SensorVariable::SoilMoisture => self.soil_moisture,
            SensorVariable::Light => self.light,
        }
    }
}
