//! Event timestamp parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Bare timestamps carry no offset; the pruner treats them as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an event `date` field. Accepts strict RFC 3339 (offset-aware) and
/// bare ISO-8601 forms; bare timestamps are interpreted as UTC. Returns
/// `None` when nothing matches — callers skip the record and log, never fail.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_event_date("2026-03-14T19:30:00+01:00").expect("parses");
        // 19:30 at +01:00 is 18:30 UTC.
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_bare_timestamp_as_utc() {
        let dt = parse_event_date("2026-03-14T19:30:00").expect("parses");
        assert_eq!(dt.hour(), 19);

        let dt = parse_event_date("2026-03-14 19:30").expect("parses");
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert!(parse_event_date("next friday").is_none());
        assert!(parse_event_date("").is_none());
        assert!(parse_event_date("14/03/2026").is_none());
    }
}
