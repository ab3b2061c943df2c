// ── Presentation helpers ──
//
// Pure functions shared by every front end: relative times, timestamp
// normalization and reading formatting.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::model::SensorVariable;

/// Placeholder for a reading the sensor did not report.
pub const MISSING: &str = "--";

/// Relative age of `then` as seen at `now`.
///
/// Coarsest two units only; anything under a minute, or in the future,
/// is "just now".
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes <= 0 {
        return "just now".to_owned();
    }
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{days}d {}h ago", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}m ago", minutes % 60)
    } else {
        format!("{minutes}m ago")
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, a key-prefixed form such as `EVENT#2024-05-01T10:00:00`
/// and zone-less values, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let raw = raw.rsplit_once('#').map_or(raw, |(_, ts)| ts);
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format a reading with its unit, or [`MISSING`].
pub fn format_reading(variable: SensorVariable, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.prec$} {}", variable.unit(), prec = variable.precision()),
        None => MISSING.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).single().expect("valid")
    }

    #[test]
    fn time_since_picks_two_units() {
        let now = now();
        assert_eq!(time_since(now - Duration::minutes(90), now), "1h 30m ago");
        assert_eq!(time_since(now - Duration::hours(25), now), "1d 1h ago");
        assert_eq!(time_since(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_since(now - Duration::seconds(30), now), "just now");
    }

    #[test]
    fn future_is_just_now() {
        let now = now();
        assert_eq!(time_since(now + Duration::hours(3), now), "just now");
    }

    #[test]
    fn prefixed_and_zoneless_timestamps_are_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single();
        assert_eq!(parse_timestamp("EVENT#2024-05-01T10:00:00"), expected);
        assert_eq!(parse_timestamp("2024-05-01T10:00:00Z"), expected);
        assert_eq!(parse_timestamp("2024-05-01T12:00:00+02:00"), expected);
        assert_eq!(parse_timestamp("2024-05-01T10:00:00.000"), expected);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("STATE#"), None);
    }

    #[test]
    fn light_has_no_decimals() {
        assert_eq!(format_reading(SensorVariable::Light, Some(1234.56)), "1235 lux");
        assert_eq!(format_reading(SensorVariable::Temperature, Some(21.46)), "21.5 °C");
        assert_eq!(format_reading(SensorVariable::Humidity, None), "--");
    }
}
