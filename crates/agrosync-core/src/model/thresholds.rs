// ── Alert thresholds ──
//
// A plot carries one threshold object: per-variable ideal ranges for its
// species plus the switch that enables alerting. A variable with neither
// bound set is not monitored and is not shown.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::CoreError;

/// A variable the alerting engine can monitor against a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoredVariable {
    Temperature,
    Humidity,
    Light,
    Irrigation,
}

impl MonitoredVariable {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Light => "lux",
            Self::Irrigation => "mm/day",
        }
    }
}

/// Inclusive ideal range for one variable. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// A range with no bound at all is skipped when rendering.
    pub fn is_visible(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// `min <= max` whenever both are present.
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesThresholds {
    pub species_id: String,
    pub temperature: Bounds,
    pub humidity: Bounds,
    pub light: Bounds,
    pub irrigation: Bounds,
    /// Alerting switch. Absent on the wire means off.
    pub enabled: bool,
}

impl SpeciesThresholds {
    pub fn bounds(&self, variable: MonitoredVariable) -> Bounds {
        match variable {
            MonitoredVariable::Temperature => self.temperature,
            MonitoredVariable::Humidity => self.humidity,
            MonitoredVariable::Light => self.light,
            MonitoredVariable::Irrigation => self.irrigation,
        }
    }

    pub fn bounds_mut(&mut self, variable: MonitoredVariable) -> &mut Bounds {
        match variable {
            MonitoredVariable::Temperature => &mut self.temperature,
            MonitoredVariable::Humidity => &mut self.humidity,
            MonitoredVariable::Light => &mut self.light,
            MonitoredVariable::Irrigation => &mut self.irrigation,
        }
    }

    /// Variables that have at least one bound, in display order.
    pub fn visible(&self) -> impl Iterator<Item = (MonitoredVariable, Bounds)> + '_ {
        MonitoredVariable::iter()
            .map(|v| (v, self.bounds(v)))
            .filter(|(_, b)| b.is_visible())
    }

    /// Copy with the alerting switch flipped.
    pub fn toggled(&self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self.clone()
        }
    }

    /// Checks run before a save is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.species_id.trim().is_empty() {
            return Err(CoreError::validation("A species must be selected"));
        }
        for variable in MonitoredVariable::iter() {
            let bounds = self.bounds(variable);
            for value in [bounds.min, bounds.max].into_iter().flatten() {
                if !value.is_finite() {
                    return Err(CoreError::validation(format!(
                        "{variable} bounds must be numbers"
                    )));
                }
            }
            if !bounds.is_ordered() {
                return Err(CoreError::validation(format!(
                    "{variable} minimum cannot exceed its maximum"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpeciesThresholds {
        SpeciesThresholds {
            species_id: "tomato".into(),
            temperature: Bounds::new(Some(12.0), Some(30.0)),
            light: Bounds::new(None, Some(50_000.0)),
            ..SpeciesThresholds::default()
        }
    }

    #[test]
    fn only_bounded_variables_are_visible() {
        let vars: Vec<_> = sample().visible().map(|(v, _)| v).collect();
        assert_eq!(vars, vec![MonitoredVariable::Temperature, MonitoredVariable::Light]);
    }

    #[test]
    fn inverted_range_fails_validation() {
        let mut t = sample();
        t.bounds_mut(MonitoredVariable::Humidity).min = Some(80.0);
        t.bounds_mut(MonitoredVariable::Humidity).max = Some(40.0);
        let err = t.validate().unwrap_err();
        assert_eq!(err.to_string(), "Humidity minimum cannot exceed its maximum");
    }

    #[test]
    fn missing_species_fails_validation() {
        let t = SpeciesThresholds {
            species_id: " ".into(),
            ..sample()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn toggled_only_flips_the_switch() {
        let t = sample();
        let flipped = t.toggled();
        assert!(flipped.enabled);
        assert_eq!(flipped.temperature, t.temperature);
    }

    #[test]
    fn open_ended_range_contains() {
        let b = Bounds::new(None, Some(10.0));
        assert!(b.contains(-5.0));
        assert!(!b.contains(10.5));
    }
}
