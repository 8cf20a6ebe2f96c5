//! Plain-text rendering of an [`AnalysisResult`] for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use calstats_core::formatting::{format_hours, format_number, percentage};
use calstats_core::models::{AttendeeStats, VendorMeetingStats};
use calstats_core::stakeholders::StakeholderGroup;
use calstats_data::analysis::AnalysisResult;
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 60;
const MIN_LABEL_WIDTH: usize = 20;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Pad `label` with trailing spaces to `width` display columns.
///
/// Labels wider than `width` get a single separating space.
fn pad_label(label: &str, width: usize) -> String {
    let shown = label.width();
    let padding = if shown < width { width - shown } else { 1 };
    format!("{}{}", label, " ".repeat(padding))
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels
        .map(|l| l.width() + 2)
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
}

fn none(out: &mut String) {
    let _ = writeln!(out, "  (none)");
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_top_by_count(out: &mut String, rows: &[(String, u32)]) {
    section(out, "Top Attendees by Meetings");
    if rows.is_empty() {
        return none(out);
    }
    let width = label_width(rows.iter().map(|(email, _)| email.as_str()));
    for (rank, (email, count)) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}{:>6} meetings",
            rank + 1,
            pad_label(email, width),
            count
        );
    }
}

fn render_top_by_time(out: &mut String, rows: &[(String, f64)], total_hours: f64) {
    section(out, "Top Attendees by Time");
    if rows.is_empty() {
        return none(out);
    }
    let width = label_width(rows.iter().map(|(email, _)| email.as_str()));
    for (rank, (email, hours)) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}{:>10}  {:>5.1}%",
            rank + 1,
            pad_label(email, width),
            format_hours(*hours),
            percentage(*hours, total_hours, 1)
        );
    }
}

fn render_group(out: &mut String, title: &str, members: &BTreeMap<String, AttendeeStats>) {
    section(out, title);
    if members.is_empty() {
        return none(out);
    }
    let width = label_width(members.keys().map(String::as_str));
    for (email, stats) in members {
        let _ = writeln!(
            out,
            "  {}{:>6} meetings  {:>10}",
            pad_label(email, width),
            stats.count,
            format_hours(stats.hours)
        );
    }
}

fn render_vendor_meetings(out: &mut String, analysts: &BTreeMap<String, VendorMeetingStats>) {
    section(out, "Gartner Meetings");
    if analysts.is_empty() {
        return none(out);
    }
    let width = label_width(analysts.keys().map(String::as_str));
    for (name, stats) in analysts {
        let _ = writeln!(
            out,
            "  {}{:>4} meetings  {:>10}",
            pad_label(name, width),
            stats.count,
            format_hours(stats.hours)
        );
        let _ = writeln!(
            out,
            "  {}inquiry {} ({})  briefing {} ({})  other {} ({})",
            " ".repeat(width),
            stats.inquiry_count,
            format_hours(stats.inquiry_hours),
            stats.briefing_count,
            format_hours(stats.briefing_hours),
            stats.other_count,
            format_hours(stats.other_hours)
        );
    }
}

fn render_weekly(out: &mut String, result: &AnalysisResult) {
    section(out, "Weekly Meeting Load");
    let weekly = &result.stats.weekly;
    if weekly.is_empty() {
        return none(out);
    }
    let active_weeks = weekly.len();
    for (week, count, hours) in weekly.iter() {
        let _ = writeln!(
            out,
            "  Week of {}  {:>4} meetings  {:>10}",
            week,
            count,
            format_hours(hours)
        );
    }
    let _ = writeln!(
        out,
        "  {} active week(s), {} per week on average",
        active_weeks,
        format_hours(result.metadata.total_hours / active_weeks as f64)
    );
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Render the whole report as a multi-line string.
pub fn render_text(result: &AnalysisResult) -> String {
    let meta = &result.metadata;
    let stats = &result.stats;
    let mut out = String::new();

    let window = match meta.days_back {
        Some(days) => format!("last {} days", days),
        None => "all events".to_string(),
    };
    let _ = writeln!(
        out,
        "Calendar statistics ({}, weeks in {})",
        window, meta.timezone
    );
    let _ = writeln!(
        out,
        "{} events loaded, {} qualifying, {} excluded, {} Gartner meetings, {} total",
        format_number(meta.events_loaded as f64, 0),
        format_number(meta.events_qualifying as f64, 0),
        format_number(meta.events_excluded as f64, 0),
        format_number(meta.vendor_meetings as f64, 0),
        format_hours(meta.total_hours)
    );

    render_top_by_count(&mut out, &stats.top_by_count);
    render_top_by_time(&mut out, &stats.top_by_time, meta.total_hours);

    for group in StakeholderGroup::ALL {
        let members = match group {
            StakeholderGroup::ExecTeam => &stats.exec_team,
            StakeholderGroup::GartnerAnalysts => &stats.gartner_analysts,
            StakeholderGroup::DirectReports => &stats.direct_reports,
        };
        render_group(&mut out, group.title(), members);
    }

    render_vendor_meetings(&mut out, &stats.gartner_meetings);
    render_weekly(&mut out, result);

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use calstats_core::models::{Attendee, CalendarEvent, EventTime};
    use calstats_core::stakeholders::StakeholderConfig;
    use calstats_data::analysis::{analyze_calendar, StatsOptions};

    fn sample_result() -> AnalysisResult {
        let event = CalendarEvent {
            id: Some("e1".into()),
            summary: Some("Gartner Inquiry Call".into()),
            description: Some("Analyst: Jane Doe".into()),
            start: Some(EventTime::at("2024-01-02T10:00:00Z")),
            end: Some(EventTime::at("2024-01-02T11:00:00Z")),
            attendees: Some(vec![Attendee {
                email: Some("a@x.com".into()),
                response_status: None,
            }]),
        };
        let config = StakeholderConfig::new(&["a@x.com"], &[], &[]);
        analyze_calendar(&[event], &config, &StatsOptions::default(), Some(90))
    }

    #[test]
    fn test_pad_label_uses_display_width() {
        assert_eq!(pad_label("abc", 6), "abc   ");
        assert_eq!(pad_label("日本", 6), "日本  ");
        assert_eq!(pad_label("toolong", 3), "toolong ");
    }

    #[test]
    fn test_render_contains_every_section() {
        let text = render_text(&sample_result());
        for title in [
            "Top Attendees by Meetings",
            "Top Attendees by Time",
            "Exec Team",
            "Gartner Analysts",
            "Direct Reports",
            "Gartner Meetings",
            "Weekly Meeting Load",
        ] {
            assert!(text.contains(title), "missing section {title}");
        }
        assert!(text.starts_with("Calendar statistics (last 90 days, weeks in UTC)"));
    }

    #[test]
    fn test_render_rows() {
        let text = render_text(&sample_result());
        assert!(text.contains("1. a@x.com"));
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("inquiry 1 (1.0h)"));
        assert!(text.contains("Week of 2024-01-01"));
        assert!(text.contains("1 active week(s), 1.0h per week on average"));
        // Only one stakeholder group has members.
        assert_eq!(text.matches("(none)").count(), 2);
    }

    #[test]
    fn test_group_rows_use_hour_format() {
        let text = render_text(&sample_result());
        let exec_row = text
            .lines()
            .find(|line| line.starts_with("  a@x.com"))
            .expect("exec team row");
        assert!(exec_row.ends_with("1.0h"), "row was {exec_row:?}");
    }

    #[test]
    fn test_render_empty_result() {
        let result = analyze_calendar(
            &[],
            &StakeholderConfig::default(),
            &StatsOptions::default(),
            None,
        );
        let text = render_text(&result);
        assert!(text.contains("all events"));
        assert_eq!(text.matches("(none)").count(), 7);
    }
}
