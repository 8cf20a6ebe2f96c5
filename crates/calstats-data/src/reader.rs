//! Calendar export discovery and loading.
//!
//! Reads Google Calendar `events.list` responses saved to disk, either as a
//! single file or as a directory of page files, and turns them into a
//! de-duplicated, start-ordered [`CalendarEvent`] list for the engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use calstats_core::error::{Result, StatsError};
use calstats_core::models::CalendarEvent;
use calstats_core::time_utils::TimezoneHandler;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_event_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Events path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Start of the look-back window ending at `now`, or `None` for all history.
pub fn window_cutoff(days_back: Option<u32>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    days_back.map(|d| now - TimeDelta::days(i64::from(d)))
}

/// Load calendar events from `path`.
///
/// * `path` – an export file, or a directory scanned for `*.json` pages.
/// * `cutoff` – when set, events starting before it are dropped.
/// * `timezone` – used to resolve start times for filtering and ordering.
///
/// Events sharing an `id` are kept once (first occurrence wins). The result
/// is sorted by start; events whose start cannot be resolved go last, in
/// input order.
///
/// A missing or unreadable single file is an error. Inside a directory, bad
/// pages are skipped with a warning.
pub fn load_events(
    path: &Path,
    cutoff: Option<DateTime<Utc>>,
    timezone: &TimezoneHandler,
) -> Result<Vec<CalendarEvent>> {
    if !path.exists() {
        return Err(StatsError::DataPathNotFound(path.to_path_buf()));
    }

    let raw_events = if path.is_dir() {
        let files = find_event_files(path);
        if files.is_empty() {
            warn!("No JSON files found in {}", path.display());
        }
        let mut all = Vec::new();
        for file in &files {
            match read_page(file) {
                Ok(events) => all.extend(events),
                Err(e) => warn!("Skipping {}: {}", file.display(), e),
            }
        }
        all
    } else {
        read_page(path)?
    };

    let loaded = raw_events.len();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;
    let mut outside_window = 0usize;

    let mut keyed: Vec<(Option<DateTime<Utc>>, CalendarEvent)> = Vec::with_capacity(loaded);
    for event in raw_events {
        if let Some(id) = &event.id {
            if !seen_ids.insert(id.clone()) {
                duplicates += 1;
                continue;
            }
        }

        let start = event
            .start
            .as_ref()
            .and_then(|t| timezone.resolve_event_time(t));

        if let (Some(cutoff_ts), Some(start_ts)) = (cutoff, start) {
            if start_ts < cutoff_ts {
                outside_window += 1;
                continue;
            }
        }

        keyed.push((start, event));
    }

    // Stable: equal starts keep input order; `None` sorts after every instant.
    keyed.sort_by_key(|(start, _)| (start.is_none(), *start));

    debug!(
        "Loaded {} events from {} ({} duplicates, {} outside window, {} kept)",
        loaded,
        path.display(),
        duplicates,
        outside_window,
        keyed.len()
    );

    Ok(keyed.into_iter().map(|(_, event)| event).collect())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Read one export page: `{"items": [...]}` or a bare array.
fn read_page(path: &Path) -> Result<Vec<CalendarEvent>> {
    let content = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(parse_items(value, path))
}

/// Pull event objects out of a parsed page, skipping malformed items.
fn parse_items(value: Value, path: &Path) -> Vec<CalendarEvent> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!("\"items\" in {} is not a list: {}", path.display(), other);
                Vec::new()
            }
        },
        other => {
            warn!("Unexpected JSON in {}: {}", path.display(), other);
            Vec::new()
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CalendarEvent>(item) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("Skipping malformed event in {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_json(dir: &Path, name: &str, body: &Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body.to_string()).unwrap();
        path
    }

    fn sample_event(id: &str, start: &str, end: &str) -> Value {
        serde_json::json!({
            "id": id,
            "summary": format!("Meeting {id}"),
            "start": {"dateTime": start},
            "end": {"dateTime": end},
            "attendees": [{"email": "a@x.com", "responseStatus": "accepted"}],
        })
    }

    fn ids(events: &[CalendarEvent]) -> Vec<&str> {
        events.iter().filter_map(|e| e.id.as_deref()).collect()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    // ── find_event_files ──────────────────────────────────────────────────────

    #[test]
    fn test_find_event_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2024");
        std::fs::create_dir_all(&sub).unwrap();
        write_json(dir.path(), "b.json", &serde_json::json!([]));
        write_json(&sub, "a.json", &serde_json::json!([]));
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let files = find_event_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_find_event_files_nonexistent_path() {
        let files = find_event_files(Path::new("/tmp/does-not-exist-calstats-xyz"));
        assert!(files.is_empty());
    }

    // ── load_events ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_events_items_envelope() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            dir.path(),
            "events.json",
            &serde_json::json!({
                "kind": "calendar#events",
                "items": [sample_event("e1", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z")],
            }),
        );

        let events = load_events(&path, None, &TimezoneHandler::default()).unwrap();
        assert_eq!(ids(&events), vec!["e1"]);
        assert_eq!(events[0].attendees.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_load_events_bare_array() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            dir.path(),
            "events.json",
            &serde_json::json!([sample_event("e1", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z")]),
        );
        let events = load_events(&path, None, &TimezoneHandler::default()).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_load_events_missing_path_is_error() {
        let err = load_events(
            Path::new("/tmp/does-not-exist-calstats-xyz.json"),
            None,
            &TimezoneHandler::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::DataPathNotFound(_)));
    }

    #[test]
    fn test_load_events_malformed_single_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_events(&path, None, &TimezoneHandler::default()).unwrap_err();
        assert!(matches!(err, StatsError::JsonParse(_)));
    }

    #[test]
    fn test_load_events_directory_skips_bad_pages() {
        let dir = TempDir::new().unwrap();
        write_json(
            dir.path(),
            "page1.json",
            &serde_json::json!({"items": [sample_event("e1", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z")]}),
        );
        std::fs::write(dir.path().join("page2.json"), "{broken").unwrap();
        write_json(
            dir.path(),
            "page3.json",
            &serde_json::json!({"items": [sample_event("e2", "2024-01-03T10:00:00Z", "2024-01-03T11:00:00Z")]}),
        );

        let events = load_events(dir.path(), None, &TimezoneHandler::default()).unwrap();
        assert_eq!(ids(&events), vec!["e1", "e2"]);
    }

    #[test]
    fn test_load_events_skips_malformed_items() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            dir.path(),
            "events.json",
            &serde_json::json!({"items": [
                {"id": "bad", "attendees": "not-a-list"},
                sample_event("good", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z"),
            ]}),
        );
        let events = load_events(&path, None, &TimezoneHandler::default()).unwrap();
        assert_eq!(ids(&events), vec!["good"]);
    }

    #[test]
    fn test_load_events_deduplicates_by_id() {
        let dir = TempDir::new().unwrap();
        let first = sample_event("dup", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z");
        let mut second = first.clone();
        second["summary"] = Value::String("Second copy".into());
        let path = write_json(dir.path(), "events.json", &serde_json::json!([first, second]));

        let events = load_events(&path, None, &TimezoneHandler::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("Meeting dup"));
    }

    #[test]
    fn test_load_events_sorted_by_start() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            dir.path(),
            "events.json",
            &serde_json::json!([
                sample_event("late", "2024-01-05T10:00:00Z", "2024-01-05T11:00:00Z"),
                {"id": "nostart", "summary": "No start"},
                sample_event("early", "2024-01-02T10:00:00Z", "2024-01-02T11:00:00Z"),
                {"id": "allday", "start": {"date": "2024-01-03"}, "end": {"date": "2024-01-04"}},
            ]),
        );

        let events = load_events(&path, None, &TimezoneHandler::default()).unwrap();
        assert_eq!(ids(&events), vec!["early", "allday", "late", "nostart"]);
    }

    #[test]
    fn test_load_events_window_filter() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            dir.path(),
            "events.json",
            &serde_json::json!([
                sample_event("old", "2023-06-01T10:00:00Z", "2023-06-01T11:00:00Z"),
                sample_event("recent", "2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z"),
            ]),
        );

        let cutoff = window_cutoff(Some(90), utc("2024-03-15T00:00:00Z"));
        let events = load_events(&path, cutoff, &TimezoneHandler::default()).unwrap();
        assert_eq!(ids(&events), vec!["recent"]);
    }

    // ── window_cutoff ─────────────────────────────────────────────────────────

    #[test]
    fn test_window_cutoff() {
        let now = utc("2024-03-31T12:00:00Z");
        assert_eq!(window_cutoff(None, now), None);
        assert_eq!(window_cutoff(Some(1), now), Some(utc("2024-03-30T12:00:00Z")));
    }
}
