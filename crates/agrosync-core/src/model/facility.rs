// ── Facility domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::FacilityId;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub location: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating a facility. Both fields are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFacility {
    pub name: String,
    pub location: String,
}

impl NewFacility {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Trim both fields and reject blanks.
    pub fn validated(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_owned();
        let location = self.location.trim().to_owned();
        if name.is_empty() {
            return Err(CoreError::validation("Facility name is required"));
        }
        if location.is_empty() {
            return Err(CoreError::validation("Facility location is required"));
        }
        Ok(Self { name, location })
    }
}
