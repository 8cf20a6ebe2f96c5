use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::models::EventTime;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Resolves calendar times to instants and instants to local calendar weeks.
///
/// Week buckets and all-day events are computed on the calendar of
/// `default_tz`; timed events keep their own offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { default_tz: Tz::UTC }
    }
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }

    /// Parse an RFC 3339 timestamp string into a UTC [`DateTime`].
    ///
    /// A naive date-time without offset is interpreted in `default_tz`.
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00'.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        // Seconds-less form with an offset, e.g. "2024-01-02T10:00+00:00".
        if let Ok(dt) = DateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M%:z") {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localize(naive);
            }
        }

        debug!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }

    /// Parse an all-day `YYYY-MM-DD` date as local midnight in `default_tz`.
    pub fn parse_all_day(&self, s: &str) -> Option<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
        self.localize(date.and_hms_opt(0, 0, 0)?)
    }

    /// Resolve one side of an event to an instant.
    ///
    /// `dateTime` wins over `date` when both are present. Returns `None`
    /// when neither form resolves.
    pub fn resolve_event_time(&self, time: &EventTime) -> Option<DateTime<Utc>> {
        if let Some(dt) = time.date_time.as_deref() {
            return self.parse_timestamp(dt);
        }
        time.date.as_deref().and_then(|d| self.parse_all_day(d))
    }

    /// Calendar date of `dt` in `default_tz`.
    pub fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.default_tz).date_naive()
    }

    /// `YYYY-MM-DD` label of the Monday starting the local week of `dt`.
    pub fn week_key(&self, dt: DateTime<Utc>) -> String {
        week_start(self.local_date(dt)).format("%Y-%m-%d").to_string()
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.default_tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The Monday on or before `date` (Monday=0 … Sunday=6).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Length of `[start, end)` in fractional hours; negative when reversed.
pub fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

// ── Tests ──────────────────────────────────────────────────────────────────────
