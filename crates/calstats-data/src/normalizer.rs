//! Per-event normalisation: resolves times, filters attendees and tags
//! vendor meetings.
//!
//! Never fails. An event that cannot contribute to statistics is simply
//! excluded (`None`).

use calstats_core::classifier::{GartnerClassifier, MeetingClassifier, MeetingFacts};
use calstats_core::models::{Attendee, CalendarEvent, NormalizedEvent};
use calstats_core::stakeholders::StakeholderConfig;
use calstats_core::time_utils::{duration_hours, TimezoneHandler};
use tracing::debug;

/// Why an event was excluded. Only used for logging and run metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// `start` or `end` missing or unparseable.
    UnresolvedTime,
    /// `end <= start`.
    NonPositiveDuration,
}

/// Turns [`CalendarEvent`]s into [`NormalizedEvent`]s.
pub struct EventNormalizer<C = GartnerClassifier> {
    timezone: TimezoneHandler,
    classifier: C,
}

impl EventNormalizer<GartnerClassifier> {
    /// Normaliser using the default keyword classifier and the analyst
    /// roster from `config`, with weeks computed in UTC.
    pub fn for_config(config: &StakeholderConfig) -> Self {
        Self::new(
            TimezoneHandler::default(),
            GartnerClassifier::with_analysts(&config.gartner_analysts),
        )
    }
}

impl<C: MeetingClassifier> EventNormalizer<C> {
    pub fn new(timezone: TimezoneHandler, classifier: C) -> Self {
        Self {
            timezone,
            classifier,
        }
    }

    /// Normalise one event, or `None` when it does not qualify.
    pub fn normalize(&self, event: &CalendarEvent) -> Option<NormalizedEvent> {
        self.try_normalize(event).ok()
    }

    /// Like [`normalize`](Self::normalize) but reports the exclusion reason.
    pub fn try_normalize(&self, event: &CalendarEvent) -> Result<NormalizedEvent, Exclusion> {
        let start = event
            .start
            .as_ref()
            .and_then(|t| self.timezone.resolve_event_time(t))
            .ok_or(Exclusion::UnresolvedTime)?;
        let end = event
            .end
            .as_ref()
            .and_then(|t| self.timezone.resolve_event_time(t))
            .ok_or(Exclusion::UnresolvedTime)?;

        let hours = duration_hours(start, end);
        if hours <= 0.0 {
            return Err(Exclusion::NonPositiveDuration);
        }

        let attendee_emails = present_attendees(event.attendees.as_deref().unwrap_or_default());

        let vendor = self.classifier.classify(&MeetingFacts {
            summary: event.summary.as_deref(),
            description: event.description.as_deref(),
            attendee_emails: &attendee_emails,
        });

        Ok(NormalizedEvent {
            duration_hours: hours,
            week_key: self.timezone.week_key(start),
            attendee_emails,
            vendor,
        })
    }

    /// Normalise a whole event list, dropping non-qualifying events.
    pub fn normalize_all(&self, events: &[CalendarEvent]) -> Vec<NormalizedEvent> {
        let mut unresolved = 0usize;
        let mut non_positive = 0usize;

        let normalized: Vec<NormalizedEvent> = events
            .iter()
            .filter_map(|event| match self.try_normalize(event) {
                Ok(n) => Some(n),
                Err(reason) => {
                    match reason {
                        Exclusion::UnresolvedTime => unresolved += 1,
                        Exclusion::NonPositiveDuration => non_positive += 1,
                    }
                    debug!(
                        "Excluding event {:?} ({:?})",
                        event.id.as_deref().or(event.summary.as_deref()),
                        reason
                    );
                    None
                }
            })
            .collect();

        debug!(
            "Normalised {} of {} events ({} unresolved times, {} non-positive durations)",
            normalized.len(),
            events.len(),
            unresolved,
            non_positive
        );
        normalized
    }
}

/// Lower-cased emails of attendees who did not decline, in source order.
fn present_attendees(attendees: &[Attendee]) -> Vec<String> {
    attendees
        .iter()
        .filter(|a| !a.is_declined())
        .filter_map(|a| a.email.as_deref())
        .filter(|email| !email.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
