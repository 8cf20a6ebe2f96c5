use anyhow::Context;
use calstats_core::models::CalendarEvent;
use calstats_core::settings::Settings;
use calstats_core::stakeholders::StakeholderConfig;
use calstats_core::time_utils::TimezoneHandler;
use calstats_data::reader::load_events;
use chrono::{DateTime, Utc};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` value to a tracing filter directive.
///
/// Unknown names are passed through unchanged so `EnvFilter` can try them.
pub fn log_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber, writing to stderr so that
/// stdout carries only the report.
///
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(log_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}

// ── Timezone ───────────────────────────────────────────────────────────────────

/// Build the week-bucket calendar from the resolved `--timezone` value.
pub fn resolve_timezone(name: &str) -> TimezoneHandler {
    if !TimezoneHandler::validate_timezone(name) {
        tracing::warn!("Unknown timezone \"{}\"; weeks will be computed in UTC", name);
        return TimezoneHandler::default();
    }
    TimezoneHandler::new(name)
}

// ── Input loading ──────────────────────────────────────────────────────────────

/// Load the stakeholder config and the calendar export concurrently.
///
/// Both loads run on the blocking pool; the engine only starts once both
/// have fully completed.
pub async fn load_inputs(
    settings: &Settings,
    timezone: TimezoneHandler,
    cutoff: Option<DateTime<Utc>>,
) -> anyhow::Result<(StakeholderConfig, Vec<CalendarEvent>)> {
    let config_path = settings.config.clone();
    let override_path = settings.override_path();
    let events_path = settings.events.clone();

    let config_task = tokio::task::spawn_blocking(move || {
        StakeholderConfig::load_layered(&config_path, Some(&override_path))
            .with_context(|| format!("loading stakeholder config {}", config_path.display()))
    });
    let events_task = tokio::task::spawn_blocking(move || {
        load_events(&events_path, cutoff, &timezone)
            .with_context(|| format!("loading events from {}", events_path.display()))
    });

    let (config, events) = tokio::try_join!(config_task, events_task)?;
    Ok((config?, events?))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
