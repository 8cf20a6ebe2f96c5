//! Top-level statistics pipeline.
//!
//! Normalises every event once, folds the results through the aggregator
//! and returns either a bare [`StatsResult`] or an [`AnalysisResult`] with
//! run metadata attached.

use calstats_core::classifier::{GartnerClassifier, DEFAULT_VENDOR_KEYWORD};
use calstats_core::models::{CalendarEvent, StatsResult};
use calstats_core::stakeholders::StakeholderConfig;
use calstats_core::time_utils::TimezoneHandler;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{StatsAggregator, DEFAULT_TOP_N};
use crate::normalizer::EventNormalizer;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one statistics run.
#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// Length of `top_by_count` / `top_by_time`.
    pub top_n: usize,
    /// Calendar used for week buckets and all-day events.
    pub timezone: TimezoneHandler,
    /// Keyword that marks a vendor meeting.
    pub vendor_keyword: String,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            timezone: TimezoneHandler::default(),
            vendor_keyword: DEFAULT_VENDOR_KEYWORD.to_string(),
        }
    }
}

/// Metadata produced alongside the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Events handed to the engine.
    pub events_loaded: usize,
    /// Events that resolved to a positive duration.
    pub events_qualifying: usize,
    /// Events dropped by the normaliser.
    pub events_excluded: usize,
    /// Qualifying events classified as vendor meetings.
    pub vendor_meetings: usize,
    /// Sum of all qualifying event durations.
    pub total_hours: f64,
    /// Look-back window applied by the loader, if any.
    pub days_back: Option<u32>,
    /// IANA name of the calendar used for week buckets.
    pub timezone: String,
}

/// The complete output of [`analyze_calendar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub stats: StatsResult,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Compute statistics with default options (UTC weeks, top 10, "gartner").
pub fn compute_stats(events: &[CalendarEvent], config: &StakeholderConfig) -> StatsResult {
    compute_stats_with(events, config, &StatsOptions::default())
}

/// Compute statistics for `events` under `config`.
///
/// Total: malformed events are excluded, never reported as errors.
pub fn compute_stats_with(
    events: &[CalendarEvent],
    config: &StakeholderConfig,
    options: &StatsOptions,
) -> StatsResult {
    run(events, config, options).0
}

/// Run the full pipeline and attach run metadata.
///
/// `days_back` is recorded as-is; filtering by window is the loader's job.
pub fn analyze_calendar(
    events: &[CalendarEvent],
    config: &StakeholderConfig,
    options: &StatsOptions,
    days_back: Option<u32>,
) -> AnalysisResult {
    let (stats, summary) = run(events, config, options);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        events_loaded: events.len(),
        events_qualifying: summary.qualifying,
        events_excluded: events.len() - summary.qualifying,
        vendor_meetings: summary.vendor_meetings,
        total_hours: summary.total_hours,
        days_back,
        timezone: options.timezone.default_tz().name().to_string(),
    };

    info!(
        "Analysed {} events: {} qualifying, {} vendor meetings, {} attendees",
        metadata.events_loaded,
        metadata.events_qualifying,
        metadata.vendor_meetings,
        stats.attendees.len()
    );

    AnalysisResult { metadata, stats }
}

// ── Private helpers ───────────────────────────────────────────────────────────

struct RunSummary {
    qualifying: usize,
    vendor_meetings: usize,
    total_hours: f64,
}

fn run(
    events: &[CalendarEvent],
    config: &StakeholderConfig,
    options: &StatsOptions,
) -> (StatsResult, RunSummary) {
    let classifier = GartnerClassifier::new(&options.vendor_keyword, &config.gartner_analysts);
    let normalizer = EventNormalizer::new(options.timezone, classifier);
    let normalized = normalizer.normalize_all(events);

    let mut aggregator = StatsAggregator::new(options.top_n);
    let mut summary = RunSummary {
        qualifying: normalized.len(),
        vendor_meetings: 0,
        total_hours: 0.0,
    };
    for event in &normalized {
        aggregator.add_event(event);
        summary.total_hours += event.duration_hours;
        if event.is_vendor_meeting() {
            summary.vendor_meetings += 1;
        }
    }

    (aggregator.finish(config), summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
