// ── Identity types ──
//
// Backend identifiers are opaque strings. Each entity gets its own newtype
// so a plot id can never be passed where a facility id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a facility (a greenhouse or field site).
    FacilityId
);
string_id!(
    /// Identifier of a plot inside a facility.
    PlotId
);
string_id!(SpeciesId);

impl PlotId {
    /// The last eight characters, used when a plot has no name.
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(7)
            .map_or(0, |(idx, _)| idx);
        &self.0[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_plot_id_takes_last_eight() {
        assert_eq!(PlotId::new("plot-0123456789").short(), "23456789");
        assert_eq!(PlotId::new("p-1").short(), "p-1");
    }

    #[test]
    fn ids_serialize_as_bare_strings() {
        let json = serde_json::to_string(&FacilityId::new("f-1")).expect("serialize");
        assert_eq!(json, "\"f-1\"");
    }
}
