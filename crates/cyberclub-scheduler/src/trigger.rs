//! Job triggers: fixed intervals and wall-clock cron in a named zone.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use croner::Cron;

use cyberclub_core::error::{ClubError, Result};

/// When a job fires.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Every `Duration`, measured from the end of the previous tick.
    Interval(Duration),
    /// A cron expression evaluated in a named IANA zone, so "07:00" means
    /// 07:00 on the club's wall clock across DST shifts.
    Cron { expr: String, zone: Tz },
}

impl Trigger {
    pub fn interval(period: Duration) -> Self {
        Self::Interval(period)
    }

    /// Validate a cron expression and zone name. Bad input is a
    /// configuration error — the process should refuse to start rather than
    /// run a job at the wrong time.
    pub fn cron(expr: &str, zone_name: &str) -> Result<Self> {
        let zone: Tz = zone_name
            .parse()
            .map_err(|_| ClubError::config(format!("Unknown time zone: {zone_name}")))?;
        Cron::new(expr)
            .parse()
            .map_err(|e| ClubError::config(format!("Invalid cron expression '{expr}': {e}")))?;
        Ok(Self::Cron { expr: expr.to_string(), zone })
    }

    /// The next fire instant strictly after `now`.
    pub fn next_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Interval(period) => {
                let period = chrono::Duration::from_std(*period).ok()?;
                Some(now + period)
            }
            Self::Cron { expr, zone } => {
                // Validated at construction; a parse failure here means the
                // expression was mutated, and the job runner treats None as
                // "stop this job".
                let cron = match Cron::new(expr).parse() {
                    Ok(cron) => cron,
                    Err(e) => {
                        tracing::warn!("Cannot parse cron expression '{expr}': {e}");
                        return None;
                    }
                };
                let local = now.with_timezone(zone);
                cron.find_next_occurrence(&local, false)
                    .ok()
                    .map(|next| next.with_timezone(&Utc))
            }
        }
    }

    /// How long to sleep from `now` until the next fire.
    pub fn sleep_from(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_fire(now)
            .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_interval_next_fire() {
        let trigger = Trigger::interval(Duration::from_secs(60));
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let next = trigger.next_fire(now).expect("next");
        assert_eq!(next, now + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_cron_daily_seven_in_utc() {
        let trigger = Trigger::cron("0 7 * * *", "UTC").expect("trigger");
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let next = trigger.next_fire(now).expect("next");
        // Past 07:00 today, so tomorrow.
        assert_eq!(next.hour(), 7);
        assert_eq!(next.minute(), 0);
        assert_eq!(next.date_naive(), now.date_naive() + chrono::Duration::days(1));
    }

    #[test]
    fn test_cron_respects_named_zone() {
        let trigger = Trigger::cron("0 7 * * *", "Africa/Algiers").expect("trigger");
        // Algiers is UTC+1 year-round: 07:00 local is 06:00 UTC.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let next = trigger.next_fire(now).expect("next");
        assert_eq!(next.hour(), 6);
        assert_eq!(next.date_naive(), now.date_naive());
    }

    #[test]
    fn test_bad_zone_is_config_error() {
        assert!(matches!(
            Trigger::cron("0 7 * * *", "Mars/Olympus"),
            Err(ClubError::Config(_))
        ));
    }

    #[test]
    fn test_bad_cron_is_config_error() {
        assert!(matches!(
            Trigger::cron("not a cron", "UTC"),
            Err(ClubError::Config(_))
        ));
    }
}
