use serde::{Deserialize, Serialize};

use super::ids::SpeciesId;

/// A crop species. Its name is the identity operators work with; the
/// server id is only present on records the backend has keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: Option<SpeciesId>,
    pub name: String,
}

impl Species {
    /// Case-insensitive name match, ignoring surrounding whitespace.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
