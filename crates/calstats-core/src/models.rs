use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Calendar input ────────────────────────────────────────────────────────────

/// One side (`start` or `end`) of a Google Calendar event.
///
/// Timed events carry `dateTime`; all-day events carry `date`. Both are kept
/// as raw strings so that a malformed value excludes the event during
/// normalisation instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// RFC 3339 instant, e.g. `"2024-01-02T10:00:00-05:00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day date, e.g. `"2024-01-02"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// IANA zone the event was created in. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// Build a timed value.
    pub fn at(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    /// Build an all-day value.
    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }
}

/// An invitee on a calendar event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `"accepted"`, `"declined"`, `"tentative"` or `"needsAction"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    /// Whether this attendee declined the invitation.
    pub fn is_declined(&self) -> bool {
        self.response_status.as_deref() == Some("declined")
    }
}

/// A single calendar event as returned by the Google Calendar `events.list`
/// API with `singleEvents=true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Provider identifier; used by the reader for de-duplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

// ── Normalised event ──────────────────────────────────────────────────────────

/// Sub-type of a vendor-analyst meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorType {
    Inquiry,
    Briefing,
    Other,
}

impl VendorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorType::Inquiry => "inquiry",
            VendorType::Briefing => "briefing",
            VendorType::Other => "other",
        }
    }
}

impl std::fmt::Display for VendorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying an event as a vendor-analyst meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorClassification {
    pub kind: VendorType,
    /// Free-text analyst name, used verbatim as the roll-up key.
    pub analyst_name: String,
}

/// Per-event facts derived from a qualifying [`CalendarEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Strictly positive event length in hours.
    pub duration_hours: f64,
    /// `YYYY-MM-DD` of the Monday starting the event's week.
    pub week_key: String,
    /// Lower-cased attendee emails, declines removed, in source order.
    pub attendee_emails: Vec<String>,
    /// `Some` when the event is a vendor-analyst meeting.
    pub vendor: Option<VendorClassification>,
}

impl NormalizedEvent {
    pub fn is_vendor_meeting(&self) -> bool {
        self.vendor.is_some()
    }
}

// ── Aggregated output ─────────────────────────────────────────────────────────

/// Meeting count and total hours for one attendee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendeeStats {
    pub count: u32,
    pub hours: f64,
}

impl AttendeeStats {
    /// Accumulate one meeting of `hours` length.
    pub fn record(&mut self, hours: f64) {
        self.count += 1;
        self.hours += hours;
    }
}

/// Vendor-meeting totals for one analyst, split by [`VendorType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorMeetingStats {
    pub count: u32,
    pub hours: f64,
    pub inquiry_count: u32,
    pub inquiry_hours: f64,
    pub briefing_count: u32,
    pub briefing_hours: f64,
    pub other_count: u32,
    pub other_hours: f64,
}

impl VendorMeetingStats {
    /// Accumulate one meeting into the total and the matching sub-bucket.
    pub fn record(&mut self, kind: VendorType, hours: f64) {
        self.count += 1;
        self.hours += hours;
        match kind {
            VendorType::Inquiry => {
                self.inquiry_count += 1;
                self.inquiry_hours += hours;
            }
            VendorType::Briefing => {
                self.briefing_count += 1;
                self.briefing_hours += hours;
            }
            VendorType::Other => {
                self.other_count += 1;
                self.other_hours += hours;
            }
        }
    }
}

/// Sparse weekly time series stored as parallel arrays, ascending by week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub weeks: Vec<String>,
    pub counts: Vec<u32>,
    pub hours: Vec<f64>,
}

impl WeeklySeries {
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Iterate `(week, count, hours)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32, f64)> + '_ {
        self.weeks
            .iter()
            .zip(self.counts.iter())
            .zip(self.hours.iter())
            .map(|((w, c), h)| (w.as_str(), *c, *h))
    }
}

/// Immutable snapshot produced by one aggregation run.
///
/// Maps are [`BTreeMap`]s so serialised output is identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    /// Attendees ranked by meeting count, highest first.
    pub top_by_count: Vec<(String, u32)>,
    /// Attendees ranked by meeting hours, highest first.
    pub top_by_time: Vec<(String, f64)>,
    pub exec_team: BTreeMap<String, AttendeeStats>,
    pub gartner_analysts: BTreeMap<String, AttendeeStats>,
    pub direct_reports: BTreeMap<String, AttendeeStats>,
    /// Every attendee seen in at least one qualifying event.
    pub attendees: BTreeMap<String, AttendeeStats>,
    /// Vendor-meeting roll-up keyed by analyst name.
    pub gartner_meetings: BTreeMap<String, VendorMeetingStats>,
    pub weekly: WeeklySeries,
}
