//! Folds normalised events into a [`StatsResult`].
//!
//! One pass accumulates attendee, week and vendor totals; [`StatsAggregator::finish`]
//! then ranks attendees, cuts the stakeholder roll-ups and emits the weekly
//! series. Pure: no I/O, no shared state between runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use calstats_core::models::{
    AttendeeStats, NormalizedEvent, StatsResult, VendorMeetingStats, WeeklySeries,
};
use calstats_core::stakeholders::{StakeholderConfig, StakeholderGroup};

/// Ranking length used when none is configured.
pub const DEFAULT_TOP_N: usize = 10;

// ── WeekTotals ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct WeekTotals {
    count: u32,
    hours: f64,
}

// ── StatsAggregator ───────────────────────────────────────────────────────────

/// Running state for one aggregation run.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    top_n: usize,
    /// Attendee totals; `first_seen` keeps insertion order for tie-breaks.
    attendees: HashMap<String, AttendeeStats>,
    first_seen: Vec<String>,
    /// Keyed by ISO Monday date, so iteration order is chronological.
    weeks: BTreeMap<String, WeekTotals>,
    vendors: BTreeMap<String, VendorMeetingStats>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl StatsAggregator {
    /// Create an empty aggregator whose rankings keep `top_n` entries.
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            attendees: HashMap::new(),
            first_seen: Vec::new(),
            weeks: BTreeMap::new(),
            vendors: BTreeMap::new(),
        }
    }

    /// Accumulate one normalised event.
    pub fn add_event(&mut self, event: &NormalizedEvent) {
        let hours = event.duration_hours;

        for email in &event.attendee_emails {
            match self.attendees.get_mut(email) {
                Some(stats) => stats.record(hours),
                None => {
                    let mut stats = AttendeeStats::default();
                    stats.record(hours);
                    self.attendees.insert(email.clone(), stats);
                    self.first_seen.push(email.clone());
                }
            }
        }

        let week = self.weeks.entry(event.week_key.clone()).or_default();
        week.count += 1;
        week.hours += hours;

        if let Some(vendor) = &event.vendor {
            self.vendors
                .entry(vendor.analyst_name.clone())
                .or_default()
                .record(vendor.kind, hours);
        }
    }

    /// Number of distinct attendees seen so far.
    pub fn attendee_count(&self) -> usize {
        self.first_seen.len()
    }

    /// Rank, roll up and assemble the final result.
    pub fn finish(self, config: &StakeholderConfig) -> StatsResult {
        let ranked: Vec<(&String, &AttendeeStats)> = self
            .first_seen
            .iter()
            .filter_map(|email| self.attendees.get(email).map(|s| (email, s)))
            .collect();

        // `sort_by` is stable, so equal metrics keep first-seen order.
        let mut by_count = ranked.clone();
        by_count.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        let top_by_count = by_count
            .into_iter()
            .take(self.top_n)
            .map(|(email, s)| (email.clone(), s.count))
            .collect();

        let mut by_time = ranked;
        by_time.sort_by(|a, b| b.1.hours.partial_cmp(&a.1.hours).unwrap_or(Ordering::Equal));
        let top_by_time = by_time
            .into_iter()
            .take(self.top_n)
            .map(|(email, s)| (email.clone(), s.hours))
            .collect();

        let exec_team = self.roll_up(config, StakeholderGroup::ExecTeam);
        let gartner_analysts = self.roll_up(config, StakeholderGroup::GartnerAnalysts);
        let direct_reports = self.roll_up(config, StakeholderGroup::DirectReports);

        let mut weekly = WeeklySeries::default();
        for (week, totals) in self.weeks {
            weekly.weeks.push(week);
            weekly.counts.push(totals.count);
            weekly.hours.push(totals.hours);
        }

        StatsResult {
            top_by_count,
            top_by_time,
            exec_team,
            gartner_analysts,
            direct_reports,
            attendees: self.attendees.into_iter().collect(),
            gartner_meetings: self.vendors,
            weekly,
        }
    }

    /// Configured members of `group` that attended at least one meeting.
    fn roll_up(
        &self,
        config: &StakeholderConfig,
        group: StakeholderGroup,
    ) -> BTreeMap<String, AttendeeStats> {
        config
            .members(group)
            .iter()
            .map(|email| email.to_lowercase())
            .filter_map(|email| {
                let stats = self.attendees.get(&email)?.clone();
                Some((email, stats))
            })
            .collect()
    }
}

/// Aggregate `events` in one call.
pub fn aggregate(
    events: &[NormalizedEvent],
    config: &StakeholderConfig,
    top_n: usize,
) -> StatsResult {
    let mut aggregator = StatsAggregator::new(top_n);
    for event in events {
        aggregator.add_event(event);
    }
    aggregator.finish(config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use calstats_core::models::{VendorClassification, VendorType};

    fn event(hours: f64, week: &str, emails: &[&str]) -> NormalizedEvent {
        NormalizedEvent {
            duration_hours: hours,
            week_key: week.to_string(),
            attendee_emails: emails.iter().map(|e| e.to_string()).collect(),
            vendor: None,
        }
    }

    fn vendor_event(hours: f64, kind: VendorType, analyst: &str) -> NormalizedEvent {
        NormalizedEvent {
            vendor: Some(VendorClassification {
                kind,
                analyst_name: analyst.to_string(),
            }),
            ..event(hours, "2024-01-01", &[])
        }
    }

    // ── attendee totals ──────────────────────────────────────────────────────

    #[test]
    fn test_attendee_counts_and_hours() {
        let events = vec![
            event(1.0, "2024-01-01", &["a@x.com", "b@x.com"]),
            event(0.5, "2024-01-01", &["a@x.com"]),
        ];
        let result = aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N);

        let a = &result.attendees["a@x.com"];
        assert_eq!(a.count, 2);
        assert!((a.hours - 1.5).abs() < 1e-9);
        assert_eq!(result.attendees["b@x.com"].count, 1);
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let result = aggregate(&[], &StakeholderConfig::default(), DEFAULT_TOP_N);
        assert_eq!(result, StatsResult::default());
    }

    // ── rankings ─────────────────────────────────────────────────────────────

    #[test]
    fn test_rankings_truncated_to_top_n() {
        let emails: Vec<String> = (0..15).map(|i| format!("p{i}@x.com")).collect();
        let refs: Vec<&str> = emails.iter().map(String::as_str).collect();
        let result = aggregate(
            &[event(1.0, "2024-01-01", &refs)],
            &StakeholderConfig::default(),
            DEFAULT_TOP_N,
        );
        assert_eq!(result.top_by_count.len(), 10);
        assert_eq!(result.top_by_time.len(), 10);
        assert_eq!(result.attendees.len(), 15);
    }

    #[test]
    fn test_rankings_shorter_than_top_n() {
        let result = aggregate(
            &[event(1.0, "2024-01-01", &["a@x.com", "b@x.com"])],
            &StakeholderConfig::default(),
            DEFAULT_TOP_N,
        );
        assert_eq!(result.top_by_count.len(), 2);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let events = vec![event(1.0, "2024-01-01", &["z@x.com", "a@x.com", "m@x.com"])];
        let result = aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N);
        let order: Vec<&str> = result.top_by_count.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(order, vec!["z@x.com", "a@x.com", "m@x.com"]);
    }

    #[test]
    fn test_count_and_time_rank_independently() {
        // a: many short meetings; b: one long meeting.
        let events = vec![
            event(0.25, "2024-01-01", &["a@x.com"]),
            event(0.25, "2024-01-01", &["a@x.com"]),
            event(0.25, "2024-01-01", &["a@x.com"]),
            event(4.0, "2024-01-01", &["b@x.com"]),
        ];
        let result = aggregate(&events, &StakeholderConfig::default(), 1);
        assert_eq!(result.top_by_count, vec![("a@x.com".to_string(), 3)]);
        assert_eq!(result.top_by_time, vec![("b@x.com".to_string(), 4.0)]);
    }

    #[test]
    fn test_rankings_non_increasing() {
        let events = vec![
            event(1.0, "2024-01-01", &["a@x.com", "b@x.com", "c@x.com"]),
            event(2.0, "2024-01-08", &["c@x.com", "b@x.com"]),
            event(0.5, "2024-01-15", &["c@x.com"]),
        ];
        let result = aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N);
        assert!(result.top_by_count.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(result.top_by_time.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(result.top_by_count[0].0, "c@x.com");
    }

    // ── roll-ups ─────────────────────────────────────────────────────────────

    #[test]
    fn test_roll_up_omits_absent_members() {
        let config = StakeholderConfig {
            exec_team: vec!["a@x.com".into(), "ghost@x.com".into()],
            ..Default::default()
        };
        let result = aggregate(&[event(1.0, "2024-01-01", &["a@x.com"])], &config, DEFAULT_TOP_N);

        assert_eq!(result.exec_team.len(), 1);
        assert!(result.exec_team.contains_key("a@x.com"));
        assert!(!result.exec_team.contains_key("ghost@x.com"));
    }

    #[test]
    fn test_roll_up_lowercases_configured_emails() {
        // Built directly, bypassing the config loader's normalisation.
        let config = StakeholderConfig {
            direct_reports: vec!["Dr@X.com".into()],
            ..Default::default()
        };
        let result = aggregate(&[event(1.0, "2024-01-01", &["dr@x.com"])], &config, DEFAULT_TOP_N);
        assert_eq!(result.direct_reports["dr@x.com"].count, 1);
    }

    // ── weekly series ────────────────────────────────────────────────────────

    #[test]
    fn test_weekly_series_sorted_and_sparse() {
        let events = vec![
            event(1.0, "2024-01-15", &[]),
            event(2.0, "2024-01-01", &[]),
            event(0.5, "2024-01-15", &[]),
        ];
        let result = aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N);

        assert_eq!(result.weekly.weeks, vec!["2024-01-01", "2024-01-15"]);
        assert_eq!(result.weekly.counts, vec![1, 2]);
        assert_eq!(result.weekly.hours, vec![2.0, 1.5]);
    }

    // ── vendor roll-up ───────────────────────────────────────────────────────

    #[test]
    fn test_vendor_roll_up_by_analyst() {
        let events = vec![
            vendor_event(1.0, VendorType::Inquiry, "Jane Doe"),
            vendor_event(0.5, VendorType::Briefing, "Jane Doe"),
            vendor_event(1.0, VendorType::Other, "Jane Doe"),
            vendor_event(1.0, VendorType::Inquiry, "jane doe"),
        ];
        let result = aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N);

        let jane = &result.gartner_meetings["Jane Doe"];
        assert_eq!(jane.count, 3);
        assert!((jane.hours - 2.5).abs() < 1e-9);
        assert_eq!(jane.inquiry_count, 1);
        assert_eq!(jane.briefing_count, 1);
        assert!((jane.briefing_hours - 0.5).abs() < 1e-9);
        // Names are grouped verbatim.
        assert_eq!(result.gartner_meetings["jane doe"].count, 1);
    }

    #[test]
    fn test_non_vendor_events_not_in_vendor_roll_up() {
        let result = aggregate(
            &[event(1.0, "2024-01-01", &["a@x.com"])],
            &StakeholderConfig::default(),
            DEFAULT_TOP_N,
        );
        assert!(result.gartner_meetings.is_empty());
    }

    #[test]
    fn test_incremental_matches_batch() {
        let events = vec![
            event(1.0, "2024-01-01", &["a@x.com"]),
            vendor_event(0.5, VendorType::Briefing, "Unknown"),
        ];
        let mut agg = StatsAggregator::default();
        for e in &events {
            agg.add_event(e);
        }
        assert_eq!(agg.attendee_count(), 1);
        let incremental = agg.finish(&StakeholderConfig::default());
        assert_eq!(
            incremental,
            aggregate(&events, &StakeholderConfig::default(), DEFAULT_TOP_N)
        );
    }
}
